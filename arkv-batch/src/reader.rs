use std::sync::Arc;
use std::thread;

use arkv_result::{Error, Result};
use arkv_storage::{BatchId, KeySpace, KvStore};
use arrow::record_batch::RecordBatch;
use crossbeam_channel as xchan;

use crate::codec::decode_batch;
use crate::config::ReaderConfig;
use crate::head::load_head;

/// Parallel reader over a snapshot of one batch sequence.
///
/// The head pointer is read once in [`BatchReader::open`]; batches appended
/// afterwards are invisible to this instance.
pub struct BatchReader<S: KvStore> {
    store: Arc<S>,
    keyspace: KeySpace,
    head: BatchId,
    config: ReaderConfig,
}

impl<S: KvStore> BatchReader<S> {
    pub fn open(store: Arc<S>, keyspace: KeySpace) -> Result<Self> {
        let head = load_head(store.as_ref(), &keyspace)?;
        tracing::debug!(%keyspace, head, "opened batch reader");
        Ok(Self {
            store,
            keyspace,
            head,
            config: ReaderConfig::default(),
        })
    }

    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Number of batches visible to this reader.
    pub fn head(&self) -> BatchId {
        self.head
    }

    pub fn keyspace(&self) -> &KeySpace {
        &self.keyspace
    }

    /// Fetch and decode the batch stored under `id`.
    pub fn read_batch(&self, id: BatchId) -> Result<RecordBatch> {
        let blob = self.store.find(&self.keyspace.key(id))?.ok_or_else(|| {
            Error::NotFound(format!("batch {id} of sequence {}", self.keyspace))
        })?;
        decode_batch(blob.as_ref())
    }

    /// Deliver every batch `1..=head` to `consume`.
    ///
    /// Ids are queued up front and drained by at most
    /// `config.worker_threads` scoped workers. `consume` runs on the workers,
    /// concurrently and in no particular id order. Every task runs to
    /// completion even after a failure; the first failure received is then
    /// returned. On success returns the number of batches delivered.
    pub fn read_all<F>(&self, consume: F) -> Result<usize>
    where
        F: Fn(RecordBatch) -> Result<()> + Sync,
    {
        if self.head == 0 {
            return Ok(0);
        }
        let workers = self.config.worker_threads.clamp(1, self.head as usize);

        let (task_tx, task_rx) = xchan::unbounded::<BatchId>();
        for id in 1..=self.head {
            task_tx
                .send(id)
                .map_err(|_| Error::Internal("batch task queue disconnected".into()))?;
        }
        drop(task_tx);

        let (done_tx, done_rx) = xchan::unbounded::<(BatchId, Result<()>)>();
        let consume = &consume;

        thread::scope(|scope| {
            for _ in 0..workers {
                let task_rx = task_rx.clone();
                let done_tx = done_tx.clone();
                scope.spawn(move || {
                    for id in task_rx.iter() {
                        let outcome = self.read_batch(id).and_then(consume);
                        if done_tx.send((id, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(done_tx);

            let mut delivered = 0usize;
            let mut first_error = None;
            for (id, outcome) in done_rx.iter() {
                match outcome {
                    Ok(()) => delivered += 1,
                    Err(err) => {
                        tracing::warn!(keyspace = %self.keyspace, id, error = %err, "batch task failed");
                        first_error.get_or_insert(err);
                    }
                }
            }
            tracing::debug!(keyspace = %self.keyspace, delivered, workers, "read_all finished");

            match first_error {
                Some(err) => Err(err),
                None => Ok(delivered),
            }
        })
    }
}
