use serde::Serialize;

use super::ChannelStatsSelectResult;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ChannelMetrics {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation (n - 1 divisor); zero below two values.
    #[serde(rename = "stdDev")]
    pub std_dev: f64,
}

impl From<ChannelStatsSelectResult> for ChannelMetrics {
    fn from(stats: ChannelStatsSelectResult) -> Self {
        if stats.num_values == 0 {
            return ChannelMetrics::default();
        }

        let std_dev = if stats.num_values < 2 {
            0.0
        } else {
            (stats.sum_sq_dev.unwrap_or_default() / (stats.num_values - 1) as f64).sqrt()
        };

        ChannelMetrics {
            avg: stats.mean.unwrap_or_default(),
            min: stats.min.unwrap_or_default(),
            max: stats.max.unwrap_or_default(),
            std_dev,
        }
    }
}
