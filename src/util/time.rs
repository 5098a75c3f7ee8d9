//! Parsing of the human-readable date/time shapes found in source files and
//! query parameters.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Formats carrying an explicit UTC offset, e.g. `2006-04-01 00:00:00.000 +0200`.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Formats without an offset; these are read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(input, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(input, format) {
            return Some(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}

/// Like [`parse_timestamp`], but falls back to `DD.MM.YYYY` (midnight UTC).
pub fn parse_query_date(input: &str) -> Option<DateTime<Utc>> {
    parse_timestamp(input).or_else(|| parse_day_month_year(input.trim()))
}

fn parse_day_month_year(input: &str) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = input.split('.').collect();
    if let [day, month, year] = parts.as_slice() {
        let date = NaiveDate::from_ymd_opt(
            year.trim().parse().ok()?,
            month.trim().parse().ok()?,
            day.trim().parse().ok()?,
        )?;
        return date.and_hms_opt(0, 0, 0).map(|datetime| datetime.and_utc());
    }

    None
}

/// Nanoseconds since the Unix epoch, or `None` outside 1677..2262.
pub fn to_nanos(timestamp: DateTime<Utc>) -> Option<i64> {
    timestamp.timestamp_nanos_opt()
}
