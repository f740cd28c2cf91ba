use super::KvStore;
use arkv_result::{Error, Result};
use bytes::Bytes;
use rustc_hash::FxHashMap;
use std::sync::RwLock;

/// In-memory engine used by tests, demos and the transient CLI mode.
///
/// Reads hand out `Bytes` clones of the stored value, so a blob fetched by
/// one thread stays valid even if another thread overwrites the key.
#[allow(clippy::module_name_repetitions)]
#[derive(Default)]
pub struct MemKvStore {
    blobs: RwLock<FxHashMap<Vec<u8>, Bytes>>,
}

impl MemKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvStore for MemKvStore {
    type Blob = Bytes;

    fn save(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut map = self
            .blobs
            .write()
            .map_err(|_| Error::Internal("MemKvStore write lock poisoned".into()))?;
        map.insert(key.to_vec(), Bytes::copy_from_slice(value));
        Ok(())
    }

    fn find(&self, key: &[u8]) -> Result<Option<Self::Blob>> {
        let map = self
            .blobs
            .read()
            .map_err(|_| Error::Internal("MemKvStore read lock poisoned".into()))?;
        Ok(map.get(key).cloned())
    }

    fn delete(&self, key: &[u8]) -> Result<bool> {
        let mut map = self
            .blobs
            .write()
            .map_err(|_| Error::Internal("MemKvStore write lock poisoned".into()))?;
        Ok(map.remove(key).is_some())
    }
}
