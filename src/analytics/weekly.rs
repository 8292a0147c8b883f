use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::Session;

use super::{round_to_tenth, DAY_NAMES};

/// Reported when the week has no sessions at all.
pub const DEFAULT_PRODUCTIVE_DAY: &str = "Monday";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub total_hours: f64,
    pub average_daily: f64,
    pub most_productive_day: String,
    pub total_sessions: usize,
}

/// Sunday..=Saturday of the week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    let start = date - Days::new(offset);
    (start, start + Days::new(6))
}

/// Stats for the Sunday-to-Saturday week holding `reference`'s local day.
///
/// Sessions are placed in the week by their `date` bucket. Ties for the most
/// productive day go to the earliest weekday, Sunday first.
pub fn weekly_stats<Tz: TimeZone>(sessions: &[Session], reference: &DateTime<Tz>) -> WeeklyStats {
    let (week_start, week_end) = week_bounds(reference.date_naive());

    let mut daily_totals = [0i64; 7];
    let mut total_seconds = 0i64;
    let mut total_sessions = 0usize;
    for session in sessions
        .iter()
        .filter(|session| session.date >= week_start && session.date <= week_end)
    {
        let index = session.date.weekday().num_days_from_sunday() as usize;
        daily_totals[index] += session.duration;
        total_seconds += session.duration;
        total_sessions += 1;
    }

    let most_productive_day = if total_sessions == 0 {
        DEFAULT_PRODUCTIVE_DAY.to_string()
    } else {
        let mut best = 0;
        for (index, total) in daily_totals.iter().enumerate().skip(1) {
            if *total > daily_totals[best] {
                best = index;
            }
        }
        DAY_NAMES[best].to_string()
    };

    let total_hours = total_seconds as f64 / 3600.0;
    WeeklyStats {
        total_hours: round_to_tenth(total_hours),
        average_daily: round_to_tenth(total_hours / 7.0),
        most_productive_day,
        total_sessions,
    }
}
