//! Minimal KV engine trait + implementations returning cheap-to-clone blobs.
//!
//! The engine is only asked for atomic single-key operations. There is no
//! range scan and no multi-key transaction; callers that need ordering
//! between keys (the batch writer's data-then-pointer discipline) get it by
//! issuing the writes in order and calling [`KvStore::flush`] in between.

use arkv_result::Result;

pub mod instrumented_store;
pub use instrumented_store::*;

pub mod mem_store;
pub use mem_store::*;

#[cfg(feature = "sled-support")]
pub mod sled_store;
#[cfg(feature = "sled-support")]
pub use sled_store::*;

pub trait KvStore: Send + Sync + 'static {
    type Blob: AsRef<[u8]> + Clone + Send + Sync + 'static;

    /// Store `value` under `key`, replacing any previous value atomically.
    fn save(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Fetch the value stored under `key`, if any.
    fn find(&self, key: &[u8]) -> Result<Option<Self::Blob>>;

    /// Remove `key`. Returns whether a value was present.
    fn delete(&self, key: &[u8]) -> Result<bool>;

    /// Make every completed `save` durable. In-memory engines do nothing.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

impl<S: KvStore> KvStore for std::sync::Arc<S> {
    type Blob = S::Blob;

    fn save(&self, key: &[u8], value: &[u8]) -> Result<()> {
        (**self).save(key, value)
    }

    fn find(&self, key: &[u8]) -> Result<Option<Self::Blob>> {
        (**self).find(key)
    }

    fn delete(&self, key: &[u8]) -> Result<bool> {
        (**self).delete(key)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}
