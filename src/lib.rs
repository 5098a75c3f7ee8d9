//! Ingests a weather-history CSV into SQLite and serves per-day averages and
//! summary statistics over the stored measurements.

pub mod aggregation;
pub mod channel;
pub mod dto;
pub mod import;
pub mod parser;
pub mod store;
pub mod upserter;
pub mod util;
pub mod web_interface;
