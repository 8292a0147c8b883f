use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::Session;

use super::weekday_name;

/// All sessions of one calendar day, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DateGroup {
    pub date: NaiveDate,
    pub sessions: Vec<Session>,
}

impl DateGroup {
    pub fn total_duration(&self) -> i64 {
        self.sessions.iter().map(|session| session.duration).sum()
    }
}

/// Per-day rollup for a "recent days" list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    /// `"Yesterday"` or the weekday name.
    pub label: String,
    pub total_duration: i64,
    pub session_count: usize,
}

pub fn sessions_by_date(sessions: &[Session], date: NaiveDate) -> Vec<Session> {
    sessions
        .iter()
        .filter(|session| session.date == date)
        .cloned()
        .collect()
}

pub fn total_duration_by_date(sessions: &[Session], date: NaiveDate) -> i64 {
    sessions
        .iter()
        .filter(|session| session.date == date)
        .map(|session| session.duration)
        .sum()
}

/// Sessions bucketed on the local day of `now`.
pub fn today_sessions<Tz: TimeZone>(sessions: &[Session], now: &DateTime<Tz>) -> Vec<Session> {
    sessions_by_date(sessions, now.date_naive())
}

pub fn today_total_duration<Tz: TimeZone>(sessions: &[Session], now: &DateTime<Tz>) -> i64 {
    total_duration_by_date(sessions, now.date_naive())
}

/// Partition by `date`: newest day first, and newest `start_time` first
/// inside each day.
pub fn grouped_by_date(sessions: &[Session]) -> Vec<DateGroup> {
    let mut by_date: BTreeMap<NaiveDate, Vec<Session>> = BTreeMap::new();
    for session in sessions {
        by_date
            .entry(session.date)
            .or_default()
            .push(session.clone());
    }

    by_date
        .into_iter()
        .rev()
        .map(|(date, mut sessions)| {
            sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
            DateGroup { date, sessions }
        })
        .collect()
}

/// Up to `limit` most recent days with sessions, excluding today.
pub fn recent_days<Tz: TimeZone>(
    sessions: &[Session],
    now: &DateTime<Tz>,
    limit: usize,
) -> Vec<DaySummary> {
    let today = now.date_naive();
    let yesterday = today.checked_sub_days(Days::new(1));

    grouped_by_date(sessions)
        .into_iter()
        .filter(|group| group.date != today)
        .take(limit)
        .map(|group| {
            let label = if Some(group.date) == yesterday {
                "Yesterday".to_string()
            } else {
                weekday_name(group.date).to_string()
            };
            DaySummary {
                date: group.date,
                label,
                total_duration: group.total_duration(),
                session_count: group.sessions.len(),
            }
        })
        .collect()
}
