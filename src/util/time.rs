//! Time formatting utilities.

use std::time::Duration;

use chrono::{DateTime, TimeZone};

/// Timestamp format used in report file names and the request line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Format `at` as a report timestamp, e.g. `2024-03-01_09-05-00`.
#[must_use]
pub fn report_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Default CSV name for a report requested at `timestamp`.
#[must_use]
pub fn default_report_file(timestamp: &str) -> String {
    format!("feed-report-{timestamp}.csv")
}

/// Format an elapsed duration for progress output.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn timestamp_is_file_name_safe() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 0).unwrap();
        let ts = report_timestamp(&at);
        assert_eq!(ts, "2024-03-01_09-05-00");
        assert_eq!(default_report_file(&ts), "feed-report-2024-03-01_09-05-00.csv");
    }

    #[test]
    fn elapsed_formats() {
        assert_eq!(format_elapsed(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m 05s");
    }
}
