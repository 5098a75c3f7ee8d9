use chrono::{DateTime, TimeZone, Utc};

use super::DailyAverageSelectResult;

/// Mean of one channel over one UTC calendar day.
#[derive(Clone, Debug, PartialEq)]
pub struct DailyAverage {
    /// `YYYY-MM-DD`, for display.
    pub date: String,
    /// Earliest sample of the day; use this for ordering.
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl From<DailyAverageSelectResult> for DailyAverage {
    fn from(row: DailyAverageSelectResult) -> Self {
        DailyAverage {
            date: row.date,
            timestamp: Utc.timestamp_nanos(row.first_timestamp),
            value: row.value,
        }
    }
}
