use std::{fs, path::Path, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};

use crate::repository::DEFAULT_STORAGE_KEY;

const DB_PATH_ENV: &str = "TIMETALLY_DB_PATH";
const DEBUG_ENV: &str = "TIMETALLY_DEBUG";

/// Runtime settings, read from a JSON file where every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    pub database_path: PathBuf,
    pub storage_key: String,
    pub tick_interval_ms: u64,
    pub heatmap_weeks: usize,
    pub recent_days: usize,
    pub log_level: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("timetally.sqlite3"),
            storage_key: DEFAULT_STORAGE_KEY.into(),
            tick_interval_ms: 1000,
            heatmap_weeks: 4,
            recent_days: 3,
            log_level: "info".into(),
        }
    }
}

impl TrackerConfig {
    /// Defaults when the file is missing; a file that does not parse is
    /// ignored with a warning, a file that cannot be read is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Ok(serde_json::from_str(&contents).unwrap_or_else(|err| {
            warn!("Ignoring unparseable config {}: {err}", path.display());
            Self::default()
        }))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Apply `TIMETALLY_DB_PATH` and `TIMETALLY_DEBUG` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(DB_PATH_ENV).filter(|value| !value.is_empty()) {
            self.database_path = PathBuf::from(path);
        }
        let debug_mode = lookup(DEBUG_ENV)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if debug_mode {
            self.log_level = "debug".into();
        }
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Unknown level names fall back to `Info`.
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrackerConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.storage_key, "@app_data");
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "heatmap_weeks": 6, "log_level": "warn" }"#).unwrap();

        let config = TrackerConfig::load(&path).unwrap();
        assert_eq!(config.heatmap_weeks, 6);
        assert_eq!(config.level_filter(), LevelFilter::Warn);
        assert_eq!(config.recent_days, 3);
    }

    #[test]
    fn garbage_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(TrackerConfig::load(&path).unwrap(), TrackerConfig::default());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = TrackerConfig {
            tick_interval_ms: 250,
            storage_key: "@sessions".into(),
            ..TrackerConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(TrackerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn overrides_apply_db_path_and_debug() {
        let config = TrackerConfig::default().with_overrides(|name| match name {
            "TIMETALLY_DB_PATH" => Some("/tmp/other.sqlite3".into()),
            "TIMETALLY_DEBUG" => Some("TRUE".into()),
            _ => None,
        });
        assert_eq!(config.database_path, PathBuf::from("/tmp/other.sqlite3"));
        assert_eq!(config.level_filter(), LevelFilter::Debug);

        let untouched = TrackerConfig::default().with_overrides(|_| None);
        assert_eq!(untouched, TrackerConfig::default());
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let config = TrackerConfig {
            log_level: "chatty".into(),
            ..TrackerConfig::default()
        };
        assert_eq!(config.level_filter(), LevelFilter::Info);
    }
}
