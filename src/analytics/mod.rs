//! Derived views over the session collection.
//!
//! Everything here is a pure function of a session slice plus, where a
//! "current day" matters, a reference instant whose own timezone decides the
//! local calendar day. Nothing is cached; callers recompute on demand.

use chrono::{Datelike, NaiveDate};

pub mod daily;
pub mod format;
pub mod heatmap;
pub mod weekly;

pub use daily::{
    grouped_by_date, recent_days, sessions_by_date, today_sessions, today_total_duration,
    total_duration_by_date, DateGroup, DaySummary,
};
pub use format::{format_clock, format_duration};
pub use heatmap::{activity_heatmap, intensity, intensity_level, FULL_DAY_SECONDS};
pub use weekly::{week_bounds, weekly_stats, WeeklyStats, DEFAULT_PRODUCTIVE_DAY};

/// Weekday names indexed from Sunday.
pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub fn weekday_name(date: NaiveDate) -> &'static str {
    DAY_NAMES[date.weekday().num_days_from_sunday() as usize]
}

/// Round half away from zero to one decimal place.
pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
