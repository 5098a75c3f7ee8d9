use sqlx::FromRow;

#[derive(Clone, Debug, FromRow, Default)]
pub struct ChannelStatsSelectResult {
    pub num_values: i64,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub sum_sq_dev: Option<f64>,
}
