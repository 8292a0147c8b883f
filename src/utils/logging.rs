use crate::config::TrackerConfig;

/// Install the global logger. `RUST_LOG` wins over the configured level.
///
/// Returns `false` when a logger was already installed, which is expected
/// in tests and when several trackers share a process.
pub fn init_logging(config: &TrackerConfig) -> bool {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(config.level_filter());
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.try_init().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        let config = TrackerConfig::default();
        init_logging(&config);
        assert!(!init_logging(&config));
        log::info!("logger installed");
    }
}
