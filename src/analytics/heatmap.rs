use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, TimeZone};

use crate::models::Session;

/// Tracked time that counts as a full day on the heatmap.
pub const FULL_DAY_SECONDS: i64 = 8 * 3600;

pub const DAYS_PER_WEEK: usize = 7;

/// `weeks` rows of seven intensities in `[0, 1]`, oldest day first.
///
/// The grid covers the `weeks * 7` days ending on `reference`'s local day.
/// Row 0 is the oldest week and column 0 is the first day of that row.
pub fn activity_heatmap<Tz: TimeZone>(
    sessions: &[Session],
    weeks: usize,
    reference: &DateTime<Tz>,
) -> Vec<Vec<f64>> {
    let Some(day_count) = weeks.checked_mul(DAYS_PER_WEEK).filter(|count| *count > 0) else {
        return Vec::new();
    };
    let last_day = reference.date_naive();
    let Some(first_day) = last_day.checked_sub_days(Days::new((day_count - 1) as u64)) else {
        return Vec::new();
    };

    let mut totals: HashMap<NaiveDate, i64> = HashMap::new();
    for session in sessions {
        *totals.entry(session.date).or_default() += session.duration;
    }

    (0..weeks)
        .map(|week| {
            (0..DAYS_PER_WEEK)
                .map(|weekday| {
                    let date = first_day + Days::new((week * DAYS_PER_WEEK + weekday) as u64);
                    intensity(totals.get(&date).copied().unwrap_or(0))
                })
                .collect()
        })
        .collect()
}

/// Share of a full day, clamped to `[0, 1]`.
pub fn intensity(total_seconds: i64) -> f64 {
    (total_seconds as f64 / FULL_DAY_SECONDS as f64).clamp(0.0, 1.0)
}

/// Shade bucket for a cell: 0 for no activity, then 1..=5 in steps of 0.2.
pub fn intensity_level(intensity: f64) -> u8 {
    match intensity {
        i if i <= 0.0 => 0,
        i if i <= 0.2 => 1,
        i if i <= 0.4 => 2,
        i if i <= 0.6 => 3,
        i if i <= 0.8 => 4,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;
    use crate::models::NewSession;

    fn session(start: &str, seconds: i64) -> Session {
        let start_time = DateTime::parse_from_rfc3339(start).unwrap();
        NewSession::new(
            start_time,
            start_time + chrono::Duration::seconds(seconds),
            seconds,
        )
        .into_session(format!("{start}-{seconds}"), chrono::Utc::now())
    }

    fn reference() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 28, 18, 0, 0)
            .unwrap()
    }

    #[test]
    fn grid_shape_and_normalization() {
        let sessions = vec![
            // Last cell: the reference day itself, a full 8h.
            session("2024-05-28T08:00:00+00:00", 28800),
            // Four hours split over two sessions.
            session("2024-05-27T08:00:00+00:00", 7200),
            session("2024-05-27T13:00:00+00:00", 7200),
            // First cell of the grid (28 - 27 days).
            session("2024-05-01T08:00:00+00:00", 36000),
            // Outside the window.
            session("2024-04-30T08:00:00+00:00", 28800),
        ];

        let grid = activity_heatmap(&sessions, 4, &reference());
        assert_eq!(grid.len(), 4);
        assert!(grid.iter().all(|row| row.len() == 7));

        assert_eq!(grid[3][6], 1.0);
        assert_eq!(grid[3][5], 0.5);
        assert_eq!(grid[0][0], 1.0);

        let lit: usize = grid
            .iter()
            .flatten()
            .filter(|value| **value > 0.0)
            .count();
        assert_eq!(lit, 3);
        assert!(grid.iter().flatten().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn zero_weeks_is_an_empty_grid() {
        assert!(activity_heatmap(&[], 0, &reference()).is_empty());
    }

    #[test]
    fn out_of_range_week_counts_are_an_empty_grid() {
        assert!(activity_heatmap(&[], usize::MAX, &reference()).is_empty());
        assert!(activity_heatmap(&[], usize::MAX / DAYS_PER_WEEK, &reference()).is_empty());
    }

    #[test]
    fn single_week_ends_on_reference_day() {
        let sessions = vec![session("2024-05-22T08:00:00+00:00", 14400)];
        let grid = activity_heatmap(&sessions, 1, &reference());
        assert_eq!(grid, vec![vec![1.0 / 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]]);
    }

    #[test]
    fn levels_follow_fifths() {
        assert_eq!(intensity_level(0.0), 0);
        assert_eq!(intensity_level(0.1), 1);
        assert_eq!(intensity_level(0.2), 1);
        assert_eq!(intensity_level(0.5), 3);
        assert_eq!(intensity_level(0.81), 5);
        assert_eq!(intensity_level(1.0), 5);
    }
}
