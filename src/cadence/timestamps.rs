// Timestamp parsing for exported activity logs.
//
// Exports mix formats freely (dashes vs slashes, 12- or 24-hour clocks,
// named months, date-only entries), so we try a fixed list of layouts in
// order. Values without a zone, or with a trailing UTC/GMT/Z name, are taken
// as UTC; offset values are converted to UTC so an account's timestamps all
// land on one timeline.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::TimestampError;

/// Layouts that carry their own UTC offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y/%m/%d %H:%M:%S%.f%:z",
];

/// Layouts with a time of day but no zone. `%b` and `%B` both accept short
/// and full month names when parsing.
const NAIVE_FORMATS: &[&str] = &[
    // 24-hour
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    // 12-hour
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%Y/%m/%d %I:%M:%S %p",
    "%Y/%m/%d %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    // Named months
    "%d %b %Y %H:%M:%S",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%b %d %Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
    "%B %d %Y %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d, %Y %I:%M:%S %p",
    "%B %d, %Y %I:%M %p",
    // Weekday-led, no offset
    "%a, %d %b %Y %H:%M:%S",
    "%a %b %d %H:%M:%S %Y",
    // Compact
    "%Y%m%dT%H%M%S",
];

/// Date-only layouts, read as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%d %B %Y"];

/// Trailing zone names that mean UTC.
const UTC_ZONE_NAMES: &[&str] = &["UTC", "GMT", "Z"];

/// Parse one human-readable timestamp into a UTC instant.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(TimestampError::Empty);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    let candidates = std::iter::once(s).chain(strip_utc_zone_name(s));
    for candidate in candidates {
        if let Some(instant) = parse_naive(candidate) {
            return Ok(instant);
        }
    }

    Err(TimestampError::Unrecognized(s.to_string()))
}

fn parse_naive(s: &str) -> Option<DateTime<Utc>> {
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(s, fmt)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| midnight.and_utc())
    })
}

/// `"2025-03-09 12:00:01 UTC"` -> `"2025-03-09 12:00:01"`. None when there
/// is no trailing UTC zone name or nothing is left before it.
fn strip_utc_zone_name(s: &str) -> Option<&str> {
    UTC_ZONE_NAMES
        .iter()
        .find_map(|zone| {
            let cut = s.len().checked_sub(zone.len())?;
            let tail = s.get(cut..)?;
            tail.eq_ignore_ascii_case(zone).then(|| s[..cut].trim_end())
        })
        .filter(|rest| !rest.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon_and_one() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 1).unwrap()
    }

    #[test]
    fn test_dash_and_slash_formats_agree() {
        assert_eq!(parse_timestamp("2025-03-09 12:00:01").unwrap(), noon_and_one());
        assert_eq!(parse_timestamp("2025/03/09 12:00:01").unwrap(), noon_and_one());
    }

    #[test]
    fn test_iso_with_zone_is_converted_to_utc() {
        assert_eq!(parse_timestamp("2025-03-09T12:00:01Z").unwrap(), noon_and_one());
        assert_eq!(
            parse_timestamp("2025-03-09T14:00:01+02:00").unwrap(),
            noon_and_one()
        );
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(parse_timestamp("  2025-03-09 12:00:01\n").unwrap(), noon_and_one());
    }

    #[test]
    fn test_month_first_and_named_month() {
        assert_eq!(parse_timestamp("03/09/2025 12:00:01").unwrap(), noon_and_one());
        assert_eq!(parse_timestamp("09 Mar 2025 12:00:01").unwrap(), noon_and_one());
    }

    #[test]
    fn test_date_only_is_midnight() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 9, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-09").unwrap(), expected);
    }

    #[test]
    fn test_empty_is_rejected() {
        assert_eq!(parse_timestamp("   "), Err(TimestampError::Empty));
    }

    #[test]
    fn test_twelve_hour_clock() {
        assert_eq!(parse_timestamp("2025-03-09 12:00:01 PM").unwrap(), noon_and_one());
        assert_eq!(
            parse_timestamp("2025-03-09 12:00:01 am").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 9, 0, 0, 1).unwrap()
        );
    }

    #[test]
    fn test_strip_utc_zone_name() {
        assert_eq!(
            strip_utc_zone_name("2025-03-09 12:00:01 GMT"),
            Some("2025-03-09 12:00:01")
        );
        assert_eq!(strip_utc_zone_name("2025-03-09 12:00:01z"), Some("2025-03-09 12:00:01"));
        assert_eq!(strip_utc_zone_name("UTC"), None);
        assert_eq!(strip_utc_zone_name("2025-03-09 12:00:01"), None);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            parse_timestamp("not a timestamp"),
            Err(TimestampError::Unrecognized(_))
        ));
        assert!(parse_timestamp("2025-13-45 99:99:99").is_err());
    }
}
