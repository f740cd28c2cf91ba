//! Batch sequences: append-only lists of Arrow record batches persisted in a
//! KV engine.
//!
//! Layout inside one [`KeySpace`](arkv_storage::KeySpace):
//!
//! - id `0`: head pointer, a 4-byte big-endian count of stored batches;
//! - ids `1..=head`: one Arrow IPC stream blob holding exactly one batch.
//!
//! [`BatchWriter`] appends a blob and only then republishes the pointer, so a
//! pointer never names a missing blob. [`BatchReader`] snapshots the pointer
//! and fans fetch + decode out over a bounded worker set.
//!
//! [`ChunkedBatchWriter`] / [`ChunkedBatchReader`] are the alternative
//! layout: one continuous IPC stream of many batches spread over chunk keys,
//! read back sequentially.

pub mod chunked;
pub mod codec;
pub mod config;
pub mod head;
pub mod reader;
pub mod writer;

pub use chunked::{ChunkedBatchReader, ChunkedBatchWriter, ChunkedWriteSummary};
pub use codec::{decode_batch, encode_batch};
pub use config::{ChunkedWriterConfig, ReaderConfig};
pub use head::{load_head, store_head};
pub use reader::BatchReader;
pub use writer::BatchWriter;
