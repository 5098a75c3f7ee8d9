use sqlx::SqlitePool;

use crate::{
    channel::Channel,
    dto::{ChannelStatsSelectResult, DailyAverageSelectResult, Point},
};

/// Client for the `points` table.
///
/// Cheap to clone; all clones share one connection pool. Timestamps are
/// integer nanoseconds (UTC) on both sides of this boundary.
#[derive(Clone, Debug)]
pub struct PointStore {
    pool: SqlitePool,
}

impl PointStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn clear_all(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM points")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Inserts every point whose timestamp is not stored yet, in one
    /// transaction. Existing rows are left untouched. Returns the number of
    /// rows actually inserted.
    pub async fn insert_batch_if_absent(&self, points: &[Point]) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for point in points {
            let result = sqlx::query(
                "INSERT INTO points (timestamp, channel_1, channel_2, channel_3)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(timestamp) DO NOTHING",
            )
            .bind(point.timestamp)
            .bind(point.channel_1)
            .bind(point.channel_2)
            .bind(point.channel_3)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM points")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn all_points(&self) -> Result<Vec<Point>, sqlx::Error> {
        sqlx::query_as::<_, Point>(
            "SELECT timestamp, channel_1, channel_2, channel_3 FROM points ORDER BY timestamp",
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Per-day mean of `channel` over points inside the inclusive bounds,
    /// ordered by each day's earliest sample. Days are UTC calendar days;
    /// timestamps are floored to whole seconds in integer arithmetic so a
    /// sample just before midnight stays on its own day.
    pub async fn daily_averages(
        &self,
        channel: Channel,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<Vec<DailyAverageSelectResult>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT
                strftime(
                    '%Y-%m-%d',
                    (timestamp - ((timestamp % 1000000000) + 1000000000) % 1000000000) / 1000000000,
                    'unixepoch'
                ) AS date,
                MIN(timestamp) AS first_timestamp,
                AVG({column}) AS value
            FROM points
            WHERE {column} IS NOT NULL
                AND (?1 IS NULL OR timestamp >= ?1)
                AND (?2 IS NULL OR timestamp <= ?2)
            GROUP BY date
            ORDER BY first_timestamp ASC
            "#,
            column = channel.column()
        );

        sqlx::query_as::<_, DailyAverageSelectResult>(&query)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
    }

    /// Count, mean, min, max and sum of squared deviations from the mean of
    /// `channel` over points inside the inclusive bounds.
    pub async fn channel_stats(
        &self,
        channel: Channel,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<ChannelStatsSelectResult, sqlx::Error> {
        let query = format!(
            r#"
            WITH filtered AS (
                SELECT {column} AS value
                FROM points
                WHERE {column} IS NOT NULL
                    AND (?1 IS NULL OR timestamp >= ?1)
                    AND (?2 IS NULL OR timestamp <= ?2)
            ),
            summary AS (
                SELECT COUNT(*) AS num_values, AVG(value) AS mean, MIN(value) AS min, MAX(value) AS max
                FROM filtered
            )
            SELECT
                summary.num_values,
                summary.mean,
                summary.min,
                summary.max,
                (SELECT SUM((value - summary.mean) * (value - summary.mean)) FROM filtered) AS sum_sq_dev
            FROM summary
            "#,
            column = channel.column()
        );

        sqlx::query_as::<_, ChannelStatsSelectResult>(&query)
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool)
            .await
    }
}
