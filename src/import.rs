use anyhow::Context;
use std::{io, path::Path};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    dto::RawRow,
    parser,
    store::PointStore,
    upserter::BatchUpserter,
    util::config::get_config,
};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read source after {rows_seen} rows: {source}")]
    StreamRead {
        rows_seen: usize,
        #[source]
        source: csv::Error,
    },
    #[error("failed to clear existing points: {0}")]
    Clear(#[from] sqlx::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Every record pulled from the source, rejected ones included.
    pub rows_seen: usize,
    /// Rows that ended up in a batch that committed.
    pub rows_imported: usize,
    pub rows_rejected: usize,
    pub batches_persisted: usize,
    pub batches_failed: usize,
    /// Length of every committed batch, in commit order.
    pub batch_sizes: Vec<usize>,
}

/// Rebuilds the `points` table from a CSV source.
pub struct ImportPipeline {
    store: PointStore,
    batch_size: usize,
}

impl ImportPipeline {
    pub fn new(store: PointStore, batch_size: usize) -> Self {
        Self { store, batch_size }
    }

    pub async fn run_file(&self, path: impl AsRef<Path>) -> Result<ImportSummary, ImportError> {
        let path = path.as_ref();
        info!("Reading {}", path.display());

        let reader = csv::Reader::from_path(path)
            .map_err(|source| ImportError::StreamRead { rows_seen: 0, source })?;
        self.run(reader).await
    }

    /// Clears the store, then drains `reader` once in source order.
    ///
    /// Bad rows and failed batches are logged and counted. Only a failure to
    /// read the source itself ends the run with an error, after the rows read
    /// so far have been flushed.
    pub async fn run<R: io::Read>(
        &self,
        mut reader: csv::Reader<R>,
    ) -> Result<ImportSummary, ImportError> {
        let cleared = self.store.clear_all().await?;
        info!("Cleared {} existing points", cleared);

        let mut upserter = BatchUpserter::new(self.store.clone(), self.batch_size);
        let mut summary = ImportSummary::default();
        let mut stream_error = None;

        for record in reader.deserialize::<RawRow>() {
            if let Err(err) = &record {
                if err.is_io_error() {
                    stream_error = record.err();
                    break;
                }
            }
            summary.rows_seen += 1;

            let row = match record {
                Ok(row) => row,
                Err(err) => {
                    warn!("Skipping malformed record {}: {}", summary.rows_seen, err);
                    summary.rows_rejected += 1;
                    continue;
                }
            };

            match parser::parse(&row) {
                Ok(point) => upserter.add(point).await,
                Err(rejected) => {
                    debug!("Skipping row {}: {}", summary.rows_seen, rejected);
                    summary.rows_rejected += 1;
                }
            }
        }

        let stats = upserter.finish().await;
        summary.rows_imported = stats.rows_persisted;
        summary.batches_persisted = stats.batches_persisted;
        summary.batches_failed = stats.batches_failed;
        summary.batch_sizes = stats.batch_sizes;

        if let Some(source) = stream_error {
            warn!(
                "Source became unreadable after {} rows ({} imported)",
                summary.rows_seen, summary.rows_imported
            );
            return Err(ImportError::StreamRead {
                rows_seen: summary.rows_seen,
                source,
            });
        }

        info!("CSV reading completed");
        info!(
            "Successfully imported {} records out of {} processed rows ({} rejected, {} failed batches)",
            summary.rows_imported, summary.rows_seen, summary.rows_rejected, summary.batches_failed
        );

        Ok(summary)
    }
}

pub async fn start_import(store: PointStore, path: Option<String>) -> anyhow::Result<()> {
    let path = match path {
        Some(path) => path,
        None => get_config().get_string("import_path")?,
    };
    let batch_size = get_config().get_int("import_batch_size")?.try_into()?;

    info!("Starting import");

    ImportPipeline::new(store, batch_size)
        .run_file(&path)
        .await
        .with_context(|| format!("Import of {} failed", path))?;

    Ok(())
}
