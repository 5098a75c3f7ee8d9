use chrono::{DateTime, TimeZone, Utc};
use sqlx::FromRow;

#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct Point {
    /// Nanoseconds since the Unix epoch.
    pub timestamp: i64,
    pub channel_1: Option<f64>,
    pub channel_2: Option<f64>,
    pub channel_3: Option<f64>,
}

impl Point {
    pub fn time(&self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.timestamp)
    }
}
