//! Timestamp utilities

use chrono::{DateTime, Local, Utc};

/// Layout of the generation timestamp written into report headers
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp in local time for a report header
pub fn format_report_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format(REPORT_TIMESTAMP_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_report_timestamp_round_trips_through_format() {
        let formatted = format_report_timestamp(now());
        assert_eq!(formatted.len(), 19);
        assert!(NaiveDateTime::parse_from_str(&formatted, REPORT_TIMESTAMP_FORMAT).is_ok());
    }
}
