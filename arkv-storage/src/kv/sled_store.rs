//! Persistent engine backed by `sled`.
//!
//! - Single-key atomicity comes from sled itself.
//! - `flush` forces sled's log to disk; the batch writer calls it between the
//!   data write and the head-pointer write.

use super::KvStore;
use arkv_result::{Error, Result};
use std::fmt;
use std::path::Path;

pub struct SledStore {
    db: sled::Db,
}

impl fmt::Debug for SledStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SledStore")
            .field("keys", &self.db.len())
            .finish()
    }
}

impl SledStore {
    /// Open (or create) a sled database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path)
            .map_err(|e| Error::Engine(format!("open sled at {} failed: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "opened sled store");
        Ok(Self { db })
    }

    /// Expose the underlying database if callers need advanced ops.
    pub fn db(&self) -> &sled::Db {
        &self.db
    }
}

impl KvStore for SledStore {
    type Blob = sled::IVec;

    fn save(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.db
            .insert(key, value)
            .map_err(|e| Error::Engine(format!("sled insert failed: {e}")))?;
        Ok(())
    }

    fn find(&self, key: &[u8]) -> Result<Option<Self::Blob>> {
        self.db
            .get(key)
            .map_err(|e| Error::Engine(format!("sled get failed: {e}")))
    }

    fn delete(&self, key: &[u8]) -> Result<bool> {
        let previous = self
            .db
            .remove(key)
            .map_err(|e| Error::Engine(format!("sled remove failed: {e}")))?;
        Ok(previous.is_some())
    }

    fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| Error::Engine(format!("sled flush failed: {e}")))?;
        Ok(())
    }
}
