//! Dates as entered by users: local time in the `YYYY-MM-DD hh:mm:ss` format.

use chrono::{Local, NaiveDateTime, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

lazy_static! {
    static ref DATE_SHAPE: Regex =
        Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").expect("date regex is valid");
}

/// Parses a `YYYY-MM-DD hh:mm:ss` date. Both the shape and the calendar date are checked.
pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    if !DATE_SHAPE.is_match(value) {
        return None;
    }
    NaiveDateTime::parse_from_str(value, DATE_FORMAT).ok()
}

pub fn is_date(value: &str) -> bool {
    parse_date_time(value).is_some()
}

pub fn current_date_time() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// Seconds since the Unix epoch of a local date.
pub fn date_string_to_seconds(value: &str) -> Option<i64> {
    let naive = parse_date_time(value)?;
    Local.from_local_datetime(&naive).earliest().map(|date| date.timestamp())
}

pub fn seconds_to_date_string(seconds: i64) -> Option<String> {
    Local.timestamp_opt(seconds, 0).single().map(|date| date.format(DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_shape() {
        assert!(is_date("2024-01-15 10:30:00"));
        assert!(is_date("2024-02-29 23:59:59"));
        assert!(!is_date("2023-02-29 10:00:00"));
        assert!(!is_date("2024-13-01 10:00:00"));
        assert!(!is_date("2024-1-15 10:30:00"));
        assert!(!is_date("2024-01-15T10:30:00"));
        assert!(!is_date("2024-01-15 10:30:00.123"));
        assert!(!is_date(""));
    }

    #[test]
    fn test_seconds_round_trip() {
        let seconds = date_string_to_seconds("2024-01-15 10:30:00").unwrap();
        assert_eq!(seconds_to_date_string(seconds).as_deref(), Some("2024-01-15 10:30:00"));
        assert_eq!(date_string_to_seconds("2024-01-15 10:31:00"), Some(seconds + 60));
        assert_eq!(date_string_to_seconds("not a date"), None);
    }

    #[test]
    fn test_current_date_time_is_valid() {
        assert!(is_date(&current_date_time()));
    }
}
