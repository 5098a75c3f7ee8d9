use std::{future::Future, time::Duration};
use thiserror::Error;
use tokio::time::timeout;

use crate::{
    channel::Channel,
    dto::{ChannelMetrics, DailyAverage},
    store::PointStore,
    util::time::{parse_query_date, to_nanos},
};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid field {0:?}")]
    InvalidChannel(String),
    #[error("Invalid {parameter}: {value:?}")]
    InvalidDateRange {
        parameter: &'static str,
        value: String,
    },
    #[error("Query exceeded its deadline of {0:?}")]
    Cancelled(Duration),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A validated channel plus inclusive bounds in nanoseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeQuery {
    pub channel: Channel,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl RangeQuery {
    /// Validates the raw parameters without touching the store. Bounds are
    /// exact instants; an `end` of `2020-01-01` means midnight, not the whole day.
    pub fn parse(
        channel: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self, QueryError> {
        let channel = channel
            .parse::<Channel>()
            .map_err(|err| QueryError::InvalidChannel(err.0))?;

        Ok(RangeQuery {
            channel,
            start: parse_bound("start_date", start)?,
            end: parse_bound("end_date", end)?,
        })
    }
}

fn parse_bound(parameter: &'static str, value: Option<&str>) -> Result<Option<i64>, QueryError> {
    let Some(value) = value else {
        return Ok(None);
    };

    parse_query_date(value)
        .and_then(to_nanos)
        .map(Some)
        .ok_or_else(|| QueryError::InvalidDateRange {
            parameter,
            value: value.to_string(),
        })
}

/// Read-side aggregation over stored points.
#[derive(Clone, Debug)]
pub struct AggregationEngine {
    store: PointStore,
    deadline: Option<Duration>,
}

impl AggregationEngine {
    pub fn new(store: PointStore) -> Self {
        Self {
            store,
            deadline: None,
        }
    }

    /// Store access that takes longer than `deadline` fails with
    /// [`QueryError::Cancelled`] instead of returning partial results.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// One mean per UTC calendar day, oldest day first. Empty when nothing matches.
    pub async fn daily_averages(
        &self,
        channel: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<DailyAverage>, QueryError> {
        let query = RangeQuery::parse(channel, start, end)?;
        let rows = self
            .bounded(self.store.daily_averages(query.channel, query.start, query.end))
            .await?;

        Ok(rows.into_iter().map(DailyAverage::from).collect())
    }

    /// Mean, min, max and sample standard deviation; all zero when nothing matches.
    pub async fn channel_metrics(
        &self,
        channel: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<ChannelMetrics, QueryError> {
        let query = RangeQuery::parse(channel, start, end)?;
        let stats = self
            .bounded(self.store.channel_stats(query.channel, query.start, query.end))
            .await?;

        Ok(ChannelMetrics::from(stats))
    }

    async fn bounded<T>(
        &self,
        query: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> Result<T, QueryError> {
        match self.deadline {
            Some(deadline) => timeout(deadline, query)
                .await
                .map_err(|_| QueryError::Cancelled(deadline))?
                .map_err(QueryError::from),
            None => query.await.map_err(QueryError::from),
        }
    }
}
