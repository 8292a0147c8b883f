//! Session records and the descriptors used to create or edit them.
//!
//! The JSON shape (`id`, `startTime`, `endTime`, `duration`, `date`,
//! `createdAt`) is the persisted format, so field renames here are breaking.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};

/// A completed start/stop interval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    /// Whole seconds counted by the timer; stored, not recomputed.
    pub duration: i64,
    /// Local calendar day of `start_time`.
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn validate(&self) -> TrackerResult<()> {
        validate_interval(&self.start_time, &self.end_time, self.duration)
    }

    pub(crate) fn apply(&mut self, update: SessionUpdate) {
        if let Some(start_time) = update.start_time {
            self.start_time = start_time;
        }
        if let Some(end_time) = update.end_time {
            self.end_time = end_time;
        }
        if let Some(duration) = update.duration {
            self.duration = duration;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
    }
}

/// Input to `SessionRepository::add_session`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl NewSession {
    pub fn new(start_time: DateTime<FixedOffset>, end_time: DateTime<FixedOffset>, duration: i64) -> Self {
        Self {
            start_time,
            end_time,
            duration,
            date: None,
        }
    }

    pub fn validate(&self) -> TrackerResult<()> {
        validate_interval(&self.start_time, &self.end_time, self.duration)
    }

    /// The explicit bucket if one was given, otherwise the local day of `start_time`.
    pub fn bucket_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| local_date_of(&self.start_time))
    }

    pub(crate) fn into_session(self, id: String, created_at: DateTime<Utc>) -> Session {
        let date = self.bucket_date();
        Session {
            id,
            start_time: self.start_time,
            end_time: self.end_time,
            duration: self.duration,
            date,
            created_at,
        }
    }
}

/// Partial edit merged into an existing session. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl SessionUpdate {
    pub fn is_empty(&self) -> bool {
        self.start_time.is_none()
            && self.end_time.is_none()
            && self.duration.is_none()
            && self.date.is_none()
    }
}

/// Calendar day of `instant` in its own offset, not in UTC.
pub fn local_date_of(instant: &DateTime<FixedOffset>) -> NaiveDate {
    instant.date_naive()
}

fn validate_interval(
    start_time: &DateTime<FixedOffset>,
    end_time: &DateTime<FixedOffset>,
    duration: i64,
) -> TrackerResult<()> {
    if duration < 0 {
        return Err(TrackerError::invalid(format!(
            "duration must not be negative (got {duration})"
        )));
    }
    if end_time <= start_time {
        return Err(TrackerError::invalid(format!(
            "end time {} is not after start time {}",
            end_time.to_rfc3339(),
            start_time.to_rfc3339()
        )));
    }
    Ok(())
}
