//! Date and date-time parsing for the LA crime export.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Formats accepted for `Date Rptd`, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

/// Date-only formats, interpreted as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parses a `Date Rptd` value such as `01/08/2020 12:00:00 AM`.
#[must_use]
pub fn parse_reported(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| parse_date(s).map(|d| d.and_time(NaiveTime::MIN)))
}

/// Parses the date portion of a `DATE OCC` value.
///
/// Only the first 10 characters are significant (`01/08/2020 12:00:00 AM`
/// and `2020-01-08T00:00:00` both reduce to their date).
#[must_use]
pub fn parse_occurred_date(s: &str) -> Option<NaiveDate> {
    let head = s.get(..10).unwrap_or(s).trim();
    parse_date(head)
}

/// Parses a normalized `HH:MM` value. Rejects out-of-range clocks such as
/// `25:60`.
#[must_use]
pub fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").ok()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_la_export_timestamp() {
        let dt = parse_reported("01/08/2020 12:00:00 AM").unwrap();
        assert_eq!(dt.to_string(), "2020-01-08 00:00:00");
        let dt = parse_reported("03/01/2023 01:15:00 PM").unwrap();
        assert_eq!(dt.to_string(), "2023-03-01 13:15:00");
    }

    #[test]
    fn parses_iso_timestamps() {
        let dt = parse_reported("2023-01-02T10:30:00.000").unwrap();
        assert_eq!(dt.to_string(), "2023-01-02 10:30:00");
        let dt = parse_reported("2023-01-02 10:30:00").unwrap();
        assert_eq!(dt.to_string(), "2023-01-02 10:30:00");
    }

    #[test]
    fn date_only_is_midnight() {
        let dt = parse_reported("2023-01-02").unwrap();
        assert_eq!(dt.to_string(), "2023-01-02 00:00:00");
        let dt = parse_reported("01/02/2023").unwrap();
        assert_eq!(dt.to_string(), "2023-01-02 00:00:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_reported("yesterday").is_none());
        assert!(parse_reported("").is_none());
    }

    #[test]
    fn occurred_date_uses_first_ten_chars() {
        assert_eq!(
            parse_occurred_date("01/08/2020 12:00:00 AM").unwrap().to_string(),
            "2020-01-08"
        );
        assert_eq!(
            parse_occurred_date("2020-01-08T00:00:00.000").unwrap().to_string(),
            "2020-01-08"
        );
        assert!(parse_occurred_date("not a date at all").is_none());
    }

    #[test]
    fn hhmm_rejects_impossible_clock() {
        assert_eq!(parse_hhmm("09:30").unwrap().to_string(), "09:30:00");
        assert!(parse_hhmm("25:60").is_none());
    }
}
