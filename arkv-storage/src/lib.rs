//! Storage primitives for arkv.
//!
//! Two layers live here:
//!
//! - [`kv`]: the [`KvStore`](kv::KvStore) capability (atomic single-key
//!   `save` / `find` / `delete` over byte keys) and its implementations.
//! - [`chunk`]: a [`ChunkStore`](chunk::ChunkStore) that presents an
//!   append-only byte stream split across consecutive integer keys, exposed
//!   as `std::io::Write` and `std::io::Read` so any streaming codec can be
//!   pointed at it.
//!
//! Key layout helpers (4-byte big-endian ids inside a [`KeySpace`]) are in
//! [`types`].

pub mod chunk;
pub mod kv;
pub mod types;

pub use chunk::{ChunkReader, ChunkStore, ChunkWriter};
pub use kv::{InstrumentedKvStore, IoStats, IoStatsSnapshot, KvStore, MemKvStore};
#[cfg(feature = "sled-support")]
pub use kv::SledStore;
pub use types::{BatchId, HEAD_POINTER_ID, KeySpace, MAX_BATCH_ID, decode_u32, encode_u32};
