/// Running-timer display, e.g. `01:02:03`. Hours grow past two digits.
pub fn format_clock(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Compact total, e.g. `2h 5m`. Seconds are dropped, negatives show as zero.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_each_field() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(3723), "01:02:03");
        assert_eq!(format_clock(360_000), "100:00:00");
    }

    #[test]
    fn duration_truncates_to_minutes() {
        assert_eq!(format_duration(0), "0h 0m");
        assert_eq!(format_duration(7559), "2h 5m");
        assert_eq!(format_duration(-30), "0h 0m");
    }
}
