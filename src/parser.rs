use thiserror::Error;

use crate::{
    dto::{Point, RawRow},
    util::time::{parse_timestamp, to_nanos},
};

/// Humidity arrives as a 0..1 fraction and is stored as a percentage.
const HUMIDITY_SCALE: f64 = 100.0;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowRejected {
    #[error("row has no date")]
    MissingDate,
    #[error("unparseable date {0:?}")]
    InvalidDate(String),
    #[error("date {0:?} is outside the storable range")]
    OutOfRange(String),
}

/// Turns one source row into a point. Only the date can cause a rejection;
/// missing or non-numeric measurements become zero.
pub fn parse(row: &RawRow) -> Result<Point, RowRejected> {
    let raw_date = row
        .formatted_date
        .as_deref()
        .map(str::trim)
        .filter(|date| !date.is_empty())
        .ok_or(RowRejected::MissingDate)?;

    let timestamp = parse_timestamp(raw_date)
        .ok_or_else(|| RowRejected::InvalidDate(raw_date.to_string()))?;
    let timestamp =
        to_nanos(timestamp).ok_or_else(|| RowRejected::OutOfRange(raw_date.to_string()))?;

    Ok(Point {
        timestamp,
        channel_1: Some(parse_number(row.temperature.as_deref())),
        channel_2: Some(parse_number(row.humidity.as_deref()) * HUMIDITY_SCALE),
        channel_3: Some(parse_number(row.apparent_temperature.as_deref())),
    })
}

fn parse_number(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn row(date: &str, temperature: &str, humidity: &str, apparent: &str) -> RawRow {
        let field = |value: &str| (!value.is_empty()).then(|| value.to_string());
        RawRow {
            formatted_date: field(date),
            temperature: field(temperature),
            humidity: field(humidity),
            apparent_temperature: field(apparent),
        }
    }

    #[test]
    fn parses_a_complete_row() {
        let point = parse(&row("2006-04-01 00:00:00.000 +0200", "9.47", "0.89", "7.38")).unwrap();

        assert_eq!(
            point.time(),
            Utc.with_ymd_and_hms(2006, 3, 31, 22, 0, 0).unwrap()
        );
        assert_eq!(point.channel_1, Some(9.47));
        assert!((point.channel_2.unwrap() - 89.0).abs() < 1e-9);
        assert_eq!(point.channel_3, Some(7.38));
    }

    #[test]
    fn missing_or_garbage_numbers_become_zero() {
        let point = parse(&row("2020-01-01T00:00", "", "wet", "NaN")).unwrap();

        assert_eq!(point.channel_1, Some(0.0));
        assert_eq!(point.channel_2, Some(0.0));
        assert_eq!(point.channel_3, Some(0.0));
    }

    #[test]
    fn rejects_rows_without_a_usable_date() {
        assert_eq!(parse(&row("", "1", "0.5", "1")), Err(RowRejected::MissingDate));
        assert_eq!(parse(&row("   ", "1", "0.5", "1")), Err(RowRejected::MissingDate));
        assert_eq!(
            parse(&row("yesterday", "1", "0.5", "1")),
            Err(RowRejected::InvalidDate("yesterday".into()))
        );
        assert_eq!(
            parse(&row("2400-01-01", "1", "0.5", "1")),
            Err(RowRejected::OutOfRange("2400-01-01".into()))
        );
    }
}
