use super::KvStore;
use arkv_result::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A thread-safe container for I/O statistics.
#[derive(Debug, Default)]
pub struct IoStats {
    pub gets: AtomicU64,
    pub get_hits: AtomicU64,
    pub get_misses: AtomicU64,
    pub get_bytes: AtomicU64,

    pub puts: AtomicU64,
    pub put_bytes: AtomicU64,

    pub deletes: AtomicU64,
    pub flushes: AtomicU64,
}

impl IoStats {
    /// Capture a point-in-time snapshot of the accumulated metrics.
    pub fn snapshot(&self) -> IoStatsSnapshot {
        IoStatsSnapshot {
            gets: self.gets.load(Ordering::Relaxed),
            get_hits: self.get_hits.load(Ordering::Relaxed),
            get_misses: self.get_misses.load(Ordering::Relaxed),
            get_bytes: self.get_bytes.load(Ordering::Relaxed),
            puts: self.puts.load(Ordering::Relaxed),
            put_bytes: self.put_bytes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
        }
    }

    /// Reset all statistics to zero.
    pub fn reset(&self) {
        self.gets.store(0, Ordering::Relaxed);
        self.get_hits.store(0, Ordering::Relaxed);
        self.get_misses.store(0, Ordering::Relaxed);
        self.get_bytes.store(0, Ordering::Relaxed);
        self.puts.store(0, Ordering::Relaxed);
        self.put_bytes.store(0, Ordering::Relaxed);
        self.deletes.store(0, Ordering::Relaxed);
        self.flushes.store(0, Ordering::Relaxed);
    }
}

/// Plain-data copy of [`IoStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IoStatsSnapshot {
    pub gets: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub get_bytes: u64,
    pub puts: u64,
    pub put_bytes: u64,
    pub deletes: u64,
    pub flushes: u64,
}

/// Wraps another engine and counts every call that passes through it.
pub struct InstrumentedKvStore<S: KvStore> {
    inner: Arc<S>,
    stats: Arc<IoStats>,
}

impl<S: KvStore> InstrumentedKvStore<S> {
    pub fn new(inner: Arc<S>) -> Self {
        Self {
            inner,
            stats: Arc::new(IoStats::default()),
        }
    }

    /// Shared handle to the counters; stays valid after the store is dropped.
    pub fn stats(&self) -> Arc<IoStats> {
        Arc::clone(&self.stats)
    }

    pub fn inner(&self) -> &Arc<S> {
        &self.inner
    }
}

impl<S: KvStore> KvStore for InstrumentedKvStore<S> {
    type Blob = S::Blob;

    fn save(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.inner.save(key, value)?;
        self.stats.puts.fetch_add(1, Ordering::Relaxed);
        self.stats
            .put_bytes
            .fetch_add(value.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    fn find(&self, key: &[u8]) -> Result<Option<Self::Blob>> {
        let found = self.inner.find(key)?;
        self.stats.gets.fetch_add(1, Ordering::Relaxed);
        match &found {
            Some(blob) => {
                self.stats.get_hits.fetch_add(1, Ordering::Relaxed);
                self.stats
                    .get_bytes
                    .fetch_add(blob.as_ref().len() as u64, Ordering::Relaxed);
            }
            None => {
                self.stats.get_misses.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(found)
    }

    fn delete(&self, key: &[u8]) -> Result<bool> {
        let existed = self.inner.delete(key)?;
        self.stats.deletes.fetch_add(1, Ordering::Relaxed);
        Ok(existed)
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()?;
        self.stats.flushes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemKvStore;

    #[test]
    fn counts_hits_misses_and_bytes() {
        let store = InstrumentedKvStore::new(Arc::new(MemKvStore::new()));
        let stats = store.stats();

        store.save(b"a", b"hello").unwrap();
        assert!(store.find(b"a").unwrap().is_some());
        assert!(store.find(b"b").unwrap().is_none());
        assert!(store.delete(b"a").unwrap());

        let snap = stats.snapshot();
        assert_eq!(snap.puts, 1);
        assert_eq!(snap.put_bytes, 5);
        assert_eq!(snap.gets, 2);
        assert_eq!(snap.get_hits, 1);
        assert_eq!(snap.get_misses, 1);
        assert_eq!(snap.get_bytes, 5);
        assert_eq!(snap.deletes, 1);

        stats.reset();
        assert_eq!(stats.snapshot(), IoStatsSnapshot::default());
    }
}
