//! Error types surfaced by the repository and timer.
//!
//! Store-level code works with `anyhow::Result` and adds context; the
//! repository and timer translate those failures into [`TrackerError`] so the
//! presentation layer can tell validation problems from storage problems.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid session: {reason}")]
    InvalidSession { reason: String },

    #[error("session not found: {id}")]
    NotFound { id: String },

    #[error("failed to read sessions from storage: {0:#}")]
    StorageRead(anyhow::Error),

    #[error("failed to save sessions, try again: {0:#}")]
    StorageWrite(anyhow::Error),

    #[error("storage unavailable: {0:#}")]
    Storage(anyhow::Error),

    #[error("failed to serialize sessions: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("timer already running")]
    TimerAlreadyRunning,

    #[error("timer is not running")]
    TimerNotRunning,
}

impl TrackerError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        TrackerError::InvalidSession {
            reason: reason.into(),
        }
    }

    /// True for failures where the in-memory state is ahead of storage.
    pub fn is_storage_write(&self) -> bool {
        matches!(self, TrackerError::StorageWrite(_))
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
