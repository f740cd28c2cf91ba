//! arkv: Arrow record batches over an embedded key-value store.
//!
//! This crate re-exports the layers of the workspace and hosts the pieces of
//! the `arkv` binary that are worth testing on their own: the collection
//! REPL and the people analytics demo.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use arkv::{CollectionStore, MemKvStore};
//!
//! let collections = CollectionStore::new(Arc::new(MemKvStore::new()));
//! collections
//!     .upsert_json("test", r#"[{"foo": "bar", "index": 42}]"#)
//!     .unwrap();
//! let rows = collections.find("test", "foo", "bar").unwrap();
//! assert_eq!(rows.len(), 1);
//! ```
//!
//! # Layers
//!
//! - `arkv-storage`: KV engines and chunked byte streams.
//! - `arkv-types`: column vectors and the batch builder.
//! - `arkv-batch`: batch sequences with a parallel reader.
//! - `arkv-query`: predicates, selection sets, aggregation, lookups.
//! - `arkv-collection`: JSON-ingested collections.

pub mod people;
pub mod repl;

pub use arkv_batch::{
    BatchReader, BatchWriter, ChunkedBatchReader, ChunkedBatchWriter, ChunkedWriterConfig,
    ReaderConfig,
};
pub use arkv_collection::{CollectionStore, IngestOptions, UpsertSummary};
pub use arkv_query::{AggregationState, Filter, GroupAggregate, GroupedQuery, Row, SelectionSet};
pub use arkv_result::{Error, Result};
pub use arkv_types::{BatchBuilder, CellValue, DecimalValue, RecordBatch};

pub mod storage {
    //! KV engines, key layout and chunk streams.

    pub use arkv_storage::{
        ChunkReader, ChunkStore, ChunkWriter, InstrumentedKvStore, IoStats, IoStatsSnapshot,
        KeySpace, KvStore, MemKvStore,
    };

    #[cfg(feature = "sled-support")]
    pub use arkv_storage::SledStore;
}

pub use storage::{KeySpace, KvStore, MemKvStore};
