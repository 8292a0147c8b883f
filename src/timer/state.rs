use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::{
    analytics::format_clock,
    models::{local_date_of, NewSession},
};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
}

/// The in-progress run. Lives only in memory; an abandoned run leaves no session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    /// Id the finished session will be recorded under.
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<FixedOffset>>,
    pub elapsed_seconds: u64,
    /// Set once a stop reached memory but not storage.
    #[serde(skip)]
    pub unsaved: bool,
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn begin(&mut self, session_id: String, started_at: DateTime<FixedOffset>) {
        *self = Self {
            status: TimerStatus::Running,
            session_id: Some(session_id),
            started_at: Some(started_at),
            elapsed_seconds: 0,
            unsaved: false,
        };
    }

    pub fn tick(&mut self) -> u64 {
        if self.is_running() {
            self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        }
        self.elapsed_seconds
    }

    /// Descriptor for the run so far; `None` unless running.
    ///
    /// The end instant is `started_at` plus the counted ticks, so `duration`
    /// always equals `end_time - start_time` and a run stopped before its
    /// first tick yields a zero-length interval.
    pub fn finish(&self) -> Option<(String, NewSession)> {
        if !self.is_running() {
            return None;
        }
        let session_id = self.session_id.clone()?;
        let start_time = self.started_at?;
        let duration = i64::try_from(self.elapsed_seconds).unwrap_or(i64::MAX);
        let end_time = Duration::try_seconds(duration)
            .and_then(|elapsed| start_time.checked_add_signed(elapsed))
            .unwrap_or(start_time);
        Some((
            session_id,
            NewSession {
                start_time,
                end_time,
                duration,
                date: Some(local_date_of(&start_time)),
            },
        ))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// What presentation renders for the timer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    /// `HH:MM:SS` of `elapsed_seconds`.
    pub display: String,
}

impl From<TimerState> for TimerSnapshot {
    fn from(state: TimerState) -> Self {
        Self {
            display: format_clock(state.elapsed_seconds),
            state,
        }
    }
}
