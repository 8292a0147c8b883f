pub mod analytics;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod store;
pub mod timer;
pub mod utils;

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use log::info;

pub use config::TrackerConfig;
pub use error::{TrackerError, TrackerResult};
pub use models::{NewSession, Session, SessionUpdate};
pub use repository::SessionRepository;
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
pub use timer::{Clock, ManualClock, SystemClock, TimerController, TimerSnapshot, TimerState};
pub use utils::init_logging;

use analytics::{DateGroup, DaySummary, WeeklyStats};

/// The session repository and the timer wired to one store.
pub struct Tracker<S> {
    repository: Arc<SessionRepository<S>>,
    timer: TimerController<S>,
    clock: Arc<dyn Clock>,
    config: TrackerConfig,
}

impl Tracker<SqliteStore> {
    /// Open the SQLite store at `config.database_path` and hydrate from it.
    pub async fn open(config: &TrackerConfig) -> TrackerResult<Self> {
        let store = SqliteStore::open(&config.database_path).map_err(TrackerError::Storage)?;
        info!("Opened session store at {}", config.database_path.display());
        Ok(Self::with_store(Arc::new(store), config.clone(), Arc::new(SystemClock)).await)
    }
}

impl<S: KeyValueStore> Tracker<S> {
    pub async fn with_store(store: Arc<S>, config: TrackerConfig, clock: Arc<dyn Clock>) -> Self {
        let repository = Arc::new(SessionRepository::load(store, config.storage_key.clone()).await);
        let timer = TimerController::new(repository.clone(), clock.clone(), config.tick_interval());
        Self {
            repository,
            timer,
            clock,
            config,
        }
    }

    pub fn repository(&self) -> &Arc<SessionRepository<S>> {
        &self.repository
    }

    pub fn timer(&self) -> &TimerController<S> {
        &self.timer
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now()
    }

    /// Sessions the views are computed from.
    ///
    /// A run whose stop failed to save is still live on the timer, so its
    /// optimistic record is left out until the run is stopped for good.
    pub async fn settled_sessions(&self) -> Vec<Session> {
        let state = self.timer.state().await;
        let mut sessions = self.repository.sessions().await;
        if let (true, Some(run_id)) = (state.unsaved, state.session_id.as_deref()) {
            sessions.retain(|session| session.id != run_id);
        }
        sessions
    }

    pub async fn today_total_duration(&self) -> i64 {
        analytics::today_total_duration(&self.settled_sessions().await, &self.now())
    }

    pub async fn weekly_stats(&self) -> WeeklyStats {
        analytics::weekly_stats(&self.settled_sessions().await, &self.now())
    }

    /// Heatmap over the configured number of weeks ending today.
    pub async fn activity_heatmap(&self) -> Vec<Vec<f64>> {
        analytics::activity_heatmap(
            &self.settled_sessions().await,
            self.config.heatmap_weeks,
            &self.now(),
        )
    }

    pub async fn grouped_by_date(&self) -> Vec<DateGroup> {
        analytics::grouped_by_date(&self.settled_sessions().await)
    }

    pub async fn recent_days(&self) -> Vec<DaySummary> {
        analytics::recent_days(
            &self.settled_sessions().await,
            &self.now(),
            self.config.recent_days,
        )
    }

    /// Stop the ticker; pending repository writes have already completed.
    pub async fn shutdown(&self) {
        self.timer.shutdown().await;
    }
}
