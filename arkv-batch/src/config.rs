/// Tuning for [`BatchReader::read_all`](crate::BatchReader::read_all).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Upper bound on concurrent fetch + decode workers. Zero is treated as one.
    pub worker_threads: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self { worker_threads: 8 }
    }
}

impl ReaderConfig {
    pub fn with_worker_threads(worker_threads: usize) -> Self {
        Self { worker_threads }
    }
}

/// Tuning for [`ChunkedBatchWriter`](crate::ChunkedBatchWriter).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkedWriterConfig {
    /// Rows per IPC record batch in the stream.
    pub rows_per_batch: usize,
    /// Bytes buffered before a chunk is written. Each flush of the buffer
    /// becomes one chunk key.
    pub write_buffer_bytes: usize,
}

impl Default for ChunkedWriterConfig {
    fn default() -> Self {
        Self {
            rows_per_batch: 20_000,
            write_buffer_bytes: 64 * 1024,
        }
    }
}
