use sqlx::FromRow;

#[derive(Clone, Debug, FromRow)]
pub struct DailyAverageSelectResult {
    pub date: String,
    pub first_timestamp: i64,
    pub value: f64,
}
