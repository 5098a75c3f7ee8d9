use anyhow::Result;
use std::sync::OnceLock;

use config::{Config, FileFormat};

use crate::upserter::DEFAULT_BATCH_SIZE;

pub fn get_config() -> &'static Config {
    static CONFIG: OnceLock<Config> = OnceLock::new();

    CONFIG.get_or_init(|| build_config().unwrap())
}

fn build_config() -> Result<Config> {
    Ok(Config::builder()
        .set_default("http_addr", "127.0.0.1:5000")?
        .set_default("database_url", "sqlite://meteoseries.db?mode=rwc")?
        .set_default("database_max_connections", 5)?
        .set_default("import_path", "weatherHistory.csv")?
        .set_default("import_batch_size", DEFAULT_BATCH_SIZE as i64)?
        .set_default("query_timeout_secs", 30)?
        .add_source(config::Environment::with_prefix("METEOSERIES"))
        .add_source(config::File::new("meteoseries.toml", FileFormat::Toml).required(false))
        .build()?)
}
