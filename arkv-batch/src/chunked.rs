//! A whole row set as one continuous IPC stream over chunk keys.
//!
//! Unlike a batch sequence there is no head pointer: the stream starts at
//! chunk id 0 of its keyspace and ends at the first missing chunk. Reading
//! is sequential and holds one decoded batch at a time.

use std::io::{BufReader, BufWriter, Write};
use std::sync::Arc;

use arkv_result::{Error, Result};
use arkv_storage::{BatchId, ChunkStore, KeySpace, KvStore};
use arkv_types::BatchBuilder;
use arrow::datatypes::SchemaRef;
use arrow::ipc::reader::StreamReader;
use arrow::ipc::writer::StreamWriter;
use arrow::record_batch::{RecordBatch, RecordBatchReader};

use crate::config::ChunkedWriterConfig;

const STREAM_BASE_ID: BatchId = 0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkedWriteSummary {
    pub rows: usize,
    pub batches: usize,
    pub chunks: u32,
    pub bytes: u64,
}

pub struct ChunkedBatchWriter<S: KvStore> {
    chunks: ChunkStore<S>,
    schema: SchemaRef,
    config: ChunkedWriterConfig,
}

impl<S: KvStore> ChunkedBatchWriter<S> {
    pub fn new(store: Arc<S>, keyspace: KeySpace, schema: SchemaRef) -> Self {
        Self {
            chunks: ChunkStore::new(store, keyspace),
            schema,
            config: ChunkedWriterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ChunkedWriterConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the stream with `rows`, cut into batches of
    /// `config.rows_per_batch` rows. `vectorize` receives the row index
    /// within its batch.
    pub fn write<T, F>(&self, rows: &[T], mut vectorize: F) -> Result<ChunkedWriteSummary>
    where
        F: FnMut(&T, usize, &mut BatchBuilder) -> Result<()>,
    {
        if self.config.rows_per_batch == 0 {
            return Err(Error::InvalidArgumentError(
                "rows_per_batch must be at least 1".into(),
            ));
        }
        let stale = self.chunks.clear(STREAM_BASE_ID)?;
        if stale > 0 {
            tracing::debug!(keyspace = %self.chunks.keyspace(), stale, "replacing chunked stream");
        }

        let sink = BufWriter::with_capacity(
            self.config.write_buffer_bytes,
            self.chunks.open_write_stream(STREAM_BASE_ID),
        );
        let mut writer = StreamWriter::try_new(sink, &self.schema)?;

        let mut batches = 0usize;
        for window in rows.chunks(self.config.rows_per_batch) {
            let mut builder = BatchBuilder::with_capacity(&self.schema, window.len())?;
            for (index, row) in window.iter().enumerate() {
                vectorize(row, index, &mut builder)?;
            }
            writer.write(&builder.finish(window.len())?)?;
            batches += 1;
            tracing::trace!(batches, rows = window.len(), "wrote stream batch");
        }

        let mut sink = writer.into_inner()?;
        sink.flush()?;
        let chunk_writer = sink.into_inner().map_err(|err| Error::Io(err.into_error()))?;

        let summary = ChunkedWriteSummary {
            rows: rows.len(),
            batches,
            chunks: chunk_writer.chunks_written(),
            bytes: chunk_writer.bytes_written(),
        };
        tracing::debug!(keyspace = %self.chunks.keyspace(), ?summary, "chunked stream written");
        Ok(summary)
    }
}

/// Sequential iterator over the batches of a chunked stream.
pub struct ChunkedBatchReader {
    inner: Box<dyn RecordBatchReader + Send>,
}

impl ChunkedBatchReader {
    /// Open the stream in `keyspace`. A stream with no chunks is `NotFound`.
    pub fn open<S: KvStore>(store: Arc<S>, keyspace: KeySpace) -> Result<Self> {
        let chunks = ChunkStore::new(store, keyspace);
        let source = chunks.open_read_stream(STREAM_BASE_ID)?;
        if source.chunks_read() == 0 {
            return Err(Error::NotFound(format!(
                "chunked stream {}",
                chunks.keyspace()
            )));
        }
        let reader = StreamReader::try_new(BufReader::new(source), None)?;
        Ok(Self {
            inner: Box::new(reader),
        })
    }

    pub fn schema(&self) -> SchemaRef {
        self.inner.schema()
    }
}

impl Iterator for ChunkedBatchReader {
    type Item = Result<RecordBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|batch| batch.map_err(Error::from))
    }
}
