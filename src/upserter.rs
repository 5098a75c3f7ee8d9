use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::{dto::Point, store::PointStore};

pub const DEFAULT_BATCH_SIZE: usize = 1000;

const PROGRESS_INTERVAL: usize = 10_000;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpsertStats {
    /// Points in batches that committed.
    pub rows_persisted: usize,
    /// Points that created a new row; duplicates of stored timestamps are not counted.
    pub rows_inserted: u64,
    pub batches_persisted: usize,
    pub batches_failed: usize,
    /// Length of every committed batch, in commit order.
    pub batch_sizes: Vec<usize>,
}

struct InFlight {
    len: usize,
    handle: JoinHandle<Result<u64, sqlx::Error>>,
}

/// Buffers points and writes them in fixed-size insert-if-absent batches.
///
/// A full buffer is handed to a spawned task so the caller can keep filling
/// the next one. At most one batch is in flight: handing off a batch first
/// waits for the previous one, so the counters are only ever touched here.
pub struct BatchUpserter {
    store: PointStore,
    batch_size: usize,
    buffer: Vec<Point>,
    in_flight: Option<InFlight>,
    stats: UpsertStats,
}

impl BatchUpserter {
    pub fn new(store: PointStore, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);

        Self {
            store,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            in_flight: None,
            stats: UpsertStats::default(),
        }
    }

    pub async fn add(&mut self, point: Point) {
        self.buffer.push(point);

        if self.buffer.len() >= self.batch_size {
            self.flush().await;
        }
    }

    /// Hands the buffered points off for persistence. Does nothing when the
    /// buffer is empty.
    pub async fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        self.settle().await;

        let batch = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.batch_size));
        let len = batch.len();
        let store = self.store.clone();

        debug!("Dispatching batch of {} points", len);
        let handle = tokio::spawn(async move { store.insert_batch_if_absent(&batch).await });
        self.in_flight = Some(InFlight { len, handle });
    }

    /// Flushes the remainder and waits for the last batch to finish.
    pub async fn finish(mut self) -> UpsertStats {
        self.flush().await;
        self.settle().await;
        self.stats
    }

    pub fn stats(&self) -> &UpsertStats {
        &self.stats
    }

    async fn settle(&mut self) {
        let Some(InFlight { len, handle }) = self.in_flight.take() else {
            return;
        };

        match handle.await {
            Ok(Ok(inserted)) => {
                let before = self.stats.rows_persisted;
                self.stats.rows_persisted += len;
                self.stats.rows_inserted += inserted;
                self.stats.batches_persisted += 1;
                self.stats.batch_sizes.push(len);

                if self.stats.rows_persisted / PROGRESS_INTERVAL > before / PROGRESS_INTERVAL {
                    info!("Processed {} records...", self.stats.rows_persisted);
                }
            }
            Ok(Err(err)) => {
                error!("Batch of {} points failed: {}", len, err);
                self.stats.batches_failed += 1;
            }
            Err(err) => {
                error!("Batch task for {} points did not complete: {}", len, err);
                self.stats.batches_failed += 1;
            }
        }
    }
}
