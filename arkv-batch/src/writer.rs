use std::sync::{Arc, Mutex};

use arkv_result::{Error, Result};
use arkv_storage::{BatchId, KeySpace, KvStore, MAX_BATCH_ID};
use arkv_types::BatchBuilder;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use crate::codec::encode_batch;
use crate::head::{load_head, store_head};

/// Appends batches to the sequence stored in one keyspace.
///
/// The writer owns the id counter of its keyspace: the head pointer is read
/// once in [`BatchWriter::open`] and afterwards advanced under a mutex, so
/// concurrent `write` calls on one writer allocate distinct ids. Open at most
/// one writer per keyspace.
pub struct BatchWriter<S: KvStore> {
    store: Arc<S>,
    keyspace: KeySpace,
    schema: SchemaRef,
    head: Mutex<BatchId>,
}

impl<S: KvStore> BatchWriter<S> {
    /// Attach to the sequence in `keyspace`, creating it lazily on first write.
    pub fn open(store: Arc<S>, keyspace: KeySpace, schema: SchemaRef) -> Result<Self> {
        let head = load_head(store.as_ref(), &keyspace)?;
        tracing::debug!(%keyspace, head, "opened batch writer");
        Ok(Self {
            store,
            keyspace,
            schema,
            head: Mutex::new(head),
        })
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn keyspace(&self) -> &KeySpace {
        &self.keyspace
    }

    /// Number of batches published so far.
    pub fn head(&self) -> Result<BatchId> {
        let head = self
            .head
            .lock()
            .map_err(|_| Error::Internal("batch writer head lock poisoned".into()))?;
        Ok(*head)
    }

    /// Build one batch of exactly `rows.len()` rows and append it.
    ///
    /// `vectorize` is called once per row with the row's index inside the
    /// batch. Returns the id the batch was stored under.
    pub fn write<T, F>(&self, rows: &[T], mut vectorize: F) -> Result<BatchId>
    where
        F: FnMut(&T, usize, &mut BatchBuilder) -> Result<()>,
    {
        let mut builder = BatchBuilder::with_capacity(&self.schema, rows.len())?;
        for (index, row) in rows.iter().enumerate() {
            vectorize(row, index, &mut builder)?;
        }
        let batch = builder.finish(rows.len())?;
        self.append(&batch)
    }

    /// Append an already built batch.
    pub fn append(&self, batch: &RecordBatch) -> Result<BatchId> {
        if batch.schema().fields() != self.schema.fields() {
            return Err(Error::InvalidArgumentError(format!(
                "batch schema does not match the schema of sequence {}",
                self.keyspace
            )));
        }
        let bytes = encode_batch(batch)?;

        let mut head = self
            .head
            .lock()
            .map_err(|_| Error::Internal("batch writer head lock poisoned".into()))?;
        let id = head
            .checked_add(1)
            .filter(|id| *id <= MAX_BATCH_ID)
            .ok_or_else(|| {
                Error::InvalidArgumentError(format!("sequence {} is full", self.keyspace))
            })?;

        // Data must be durable before the pointer names it.
        self.store.save(&self.keyspace.key(id), &bytes)?;
        self.store.flush()?;
        store_head(self.store.as_ref(), &self.keyspace, id)?;
        *head = id;

        tracing::debug!(
            keyspace = %self.keyspace,
            id,
            rows = batch.num_rows(),
            bytes = bytes.len(),
            "appended batch"
        );
        Ok(id)
    }
}
