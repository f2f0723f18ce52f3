//! Lenient commit date parsing.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

/// Offset-bearing formats, tried in order.
const OFFSET_FORMATS: &[&str] = &[
    // ISO 8601 with numeric offset
    "%Y-%m-%dT%H:%M:%S%z",
    // `git log` default: Mon Jan 15 10:30:00 2024 +0000
    "%a %b %d %H:%M:%S %Y %z",
];

/// Offset-less formats, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%a %b %d %H:%M:%S %Y",
    "%Y-%m-%d %H:%M:%S",
];

/// Parses a commit date, returning `None` when no known format matches.
///
/// Formats are tried in a fixed order: ISO with offset, ISO without offset,
/// verbose git date with offset, verbose git date without offset,
/// `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`.
pub fn try_parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, OFFSET_FORMATS[0]) {
        return Some(dt);
    }
    if let Some(dt) = parse_naive(raw, NAIVE_FORMATS[0]) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, OFFSET_FORMATS[1]) {
        return Some(dt);
    }
    if let Some(dt) = parse_naive(raw, NAIVE_FORMATS[1]) {
        return Some(dt);
    }
    if let Some(dt) = parse_naive(raw, NAIVE_FORMATS[2]) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Parses a commit date, degrading to the current time when unparseable.
pub fn parse_date_or_now(raw: &str) -> DateTime<FixedOffset> {
    try_parse_date(raw).unwrap_or_else(|| {
        debug!(date = %raw, "Unrecognised date format, using current time");
        now()
    })
}

/// Converts epoch seconds (possibly fractional) to a timestamp.
pub fn from_epoch_seconds(secs: f64) -> Option<DateTime<FixedOffset>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9) as u32;
    DateTime::from_timestamp(whole as i64, nanos).map(|dt| dt.fixed_offset())
}

/// Current time as a fixed-offset timestamp.
pub fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

fn parse_naive(raw: &str, format: &str) -> Option<DateTime<FixedOffset>> {
    NaiveDateTime::parse_from_str(raw, format)
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn iso_with_offset() {
        let dt = try_parse_date("2024-01-15T10:30:00+02:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 7200);
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn iso_with_compact_offset() {
        let dt = try_parse_date("2024-01-15T10:30:00+0000").unwrap();
        assert_eq!(dt.day(), 15);
    }

    #[test]
    fn iso_with_zulu() {
        let dt = try_parse_date("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn iso_without_offset_is_utc() {
        let dt = try_parse_date("2024-01-15T10:30:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn verbose_git_date_with_offset() {
        let dt = try_parse_date("Mon Jan 15 10:30:00 2024 -0500").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(dt.month(), 1);
    }

    #[test]
    fn verbose_git_date_without_offset() {
        let dt = try_parse_date("Mon Jan 15 10:30:00 2024").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.day(), 15);
    }

    #[test]
    fn space_separated_datetime() {
        let dt = try_parse_date("2024-03-02 08:05:09").unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (8, 5, 9));
    }

    #[test]
    fn date_only_is_midnight() {
        let dt = try_parse_date("2024-03-02").unwrap();
        assert_eq!((dt.month(), dt.day(), dt.hour()), (3, 2, 0));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert!(try_parse_date("   2024-03-02  ").is_some());
    }

    #[test]
    fn garbage_is_none() {
        assert!(try_parse_date("yesterday-ish").is_none());
        assert!(try_parse_date("").is_none());
    }

    #[test]
    fn garbage_degrades_to_now() {
        let before = now();
        let parsed = parse_date_or_now("not a date");
        assert!(parsed >= before);
    }

    #[test]
    fn epoch_seconds() {
        let dt = from_epoch_seconds(1_705_314_600.0).unwrap();
        assert_eq!(dt.year(), 2024);
        assert!(from_epoch_seconds(f64::NAN).is_none());
    }
}
