use sqlx::{migrate::Migrator, Executor, Pool, SqlitePool};
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::{
    fmt::writer::MakeWriterExt, layer::SubscriberExt, util::SubscriberInitExt,
};

pub mod api_error;
pub mod config;
pub mod time;

pub use api_error::ApiError;

pub type DB = sqlx::Sqlite;

static MIGRATOR: Migrator = sqlx::migrate!(); // defaults to "./migrations"

/// Connects using `database_url` and `database_max_connections` from the configuration.
pub async fn connect_to_db() -> anyhow::Result<SqlitePool> {
    let database_url = config::get_config().get_string("database_url")?;
    let max_connections = config::get_config()
        .get_int("database_max_connections")?
        .try_into()?;

    connect(&database_url, max_connections).await
}

/// Opens a pool and brings the schema up to date.
///
/// Connections are never recycled, so `sqlite::memory:` with a single
/// connection keeps its contents for the lifetime of the pool.
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let sqlx_options = sqlx::pool::PoolOptions::<DB>::new()
        .max_connections(max_connections)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                let statements = vec![
                    "PRAGMA journal_mode = WAL;",
                    "PRAGMA synchronous = NORMAL;",
                    "PRAGMA busy_timeout = 15000;",
                ];

                for statement in statements {
                    conn.execute(statement).await?;
                }

                Ok(())
            })
        });

    let sqlx_pool: Pool<DB> = sqlx_options.connect(database_url).await?;
    MIGRATOR.run(&sqlx_pool).await?;

    Ok(sqlx_pool)
}

pub fn setup_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::Layer::new()
                .with_writer(std::io::stdout.with_max_level(Level::INFO))
                .compact(),
        )
        .init();
}

#[cfg(test)]
pub(crate) async fn memory_store() -> crate::store::PointStore {
    let pool = connect("sqlite::memory:", 1)
        .await
        .expect("in-memory database should open");
    crate::store::PointStore::new(pool)
}
