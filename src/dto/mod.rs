pub mod channel_metrics;
pub mod channel_stats_select_result;
pub mod daily_average;
pub mod daily_average_select_result;
pub mod point;
pub mod raw_row;

pub use channel_metrics::ChannelMetrics;
pub use channel_stats_select_result::ChannelStatsSelectResult;
pub use daily_average::DailyAverage;
pub use daily_average_select_result::DailyAverageSelectResult;
pub use point::Point;
pub use raw_row::RawRow;
