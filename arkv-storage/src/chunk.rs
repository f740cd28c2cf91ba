//! Append-only byte streams split across consecutive integer keys.
//!
//! A stream opened at base id `b` is the concatenation of the values stored
//! at `b`, `b + 1`, `b + 2`, ... inside one [`KeySpace`], ending at the
//! first missing key. Chunk boundaries are whatever the producer chose:
//! every `write` call on a [`ChunkWriter`] becomes exactly one chunk, and a
//! [`ChunkReader`] never assumes a chunk size.
//!
//! The adapters implement `std::io::Write` / `std::io::Read`, so a codec
//! such as Arrow IPC can stream directly into and out of the KV engine. An
//! in-memory `Vec<u8>` or `Cursor` can stand in for them in tests.

use std::io;
use std::sync::Arc;

use arkv_result::{Error, Result};

use crate::kv::KvStore;
use crate::types::{BatchId, KeySpace};

/// Factory for chunk streams over one keyspace of a KV engine.
pub struct ChunkStore<S: KvStore> {
    store: Arc<S>,
    keyspace: KeySpace,
}

impl<S: KvStore> Clone for ChunkStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            keyspace: self.keyspace.clone(),
        }
    }
}

impl<S: KvStore> ChunkStore<S> {
    pub fn new(store: Arc<S>, keyspace: KeySpace) -> Self {
        Self { store, keyspace }
    }

    pub fn keyspace(&self) -> &KeySpace {
        &self.keyspace
    }

    /// Sink that writes one chunk per `write` call, starting at `base_id`.
    pub fn open_write_stream(&self, base_id: BatchId) -> ChunkWriter<S> {
        ChunkWriter {
            store: Arc::clone(&self.store),
            keyspace: self.keyspace.clone(),
            next_id: Some(base_id),
            chunks_written: 0,
            bytes_written: 0,
        }
    }

    /// Source over the stream starting at `base_id`. The first chunk is
    /// fetched eagerly; a missing first chunk yields an empty stream.
    pub fn open_read_stream(&self, base_id: BatchId) -> Result<ChunkReader<S>> {
        let current = self.store.find(&self.keyspace.key(base_id))?;
        let chunks_read = u32::from(current.is_some());
        Ok(ChunkReader {
            store: Arc::clone(&self.store),
            keyspace: self.keyspace.clone(),
            next_id: base_id.checked_add(1),
            current,
            cursor: 0,
            chunks_read,
        })
    }

    /// Delete every chunk of the stream at `base_id`. Returns how many were
    /// removed. Call before rewriting a stream so that stale trailing chunks
    /// of a longer previous stream are not read back as a continuation.
    pub fn clear(&self, base_id: BatchId) -> Result<u32> {
        let mut removed = 0u32;
        let mut id = Some(base_id);
        while let Some(current) = id {
            if !self.store.delete(&self.keyspace.key(current))? {
                break;
            }
            removed += 1;
            id = current.checked_add(1);
        }
        tracing::trace!(removed, base_id, "cleared chunk stream");
        Ok(removed)
    }
}

/// Write side of a chunk stream.
pub struct ChunkWriter<S: KvStore> {
    store: Arc<S>,
    keyspace: KeySpace,
    /// `None` once the id space is exhausted.
    next_id: Option<BatchId>,
    chunks_written: u32,
    bytes_written: u64,
}

impl<S: KvStore> ChunkWriter<S> {
    pub fn chunks_written(&self) -> u32 {
        self.chunks_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Id the next non-empty write will be stored under.
    pub fn next_id(&self) -> Option<BatchId> {
        self.next_id
    }
}

impl<S: KvStore> io::Write for ChunkWriter<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // An empty chunk would read back as end-of-stream.
        if buf.is_empty() {
            return Ok(0);
        }
        let id = self
            .next_id
            .ok_or_else(|| io::Error::other(Error::Internal("chunk id space exhausted".into())))?;

        self.store.save(&self.keyspace.key(id), buf)?;

        self.next_id = id.checked_add(1);
        self.chunks_written += 1;
        self.bytes_written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.store.flush()?;
        Ok(())
    }
}

/// Read side of a chunk stream.
pub struct ChunkReader<S: KvStore> {
    store: Arc<S>,
    keyspace: KeySpace,
    next_id: Option<BatchId>,
    current: Option<S::Blob>,
    cursor: usize,
    chunks_read: u32,
}

impl<S: KvStore> ChunkReader<S> {
    /// Number of chunks fetched so far, including the eager first fetch.
    pub fn chunks_read(&self) -> u32 {
        self.chunks_read
    }

    fn advance(&mut self) -> Result<()> {
        self.cursor = 0;
        self.current = match self.next_id {
            Some(id) => self.store.find(&self.keyspace.key(id))?,
            None => None,
        };
        if self.current.is_some() {
            self.chunks_read += 1;
            self.next_id = self.next_id.and_then(|id| id.checked_add(1));
        }
        Ok(())
    }
}

impl<S: KvStore> io::Read for ChunkReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let Some(chunk) = self.current.as_ref() else {
                return Ok(0);
            };
            let bytes = chunk.as_ref();
            let remaining = &bytes[self.cursor..];
            if remaining.is_empty() {
                self.advance()?;
                continue;
            }

            let n = remaining.len().min(buf.len());
            buf[..n].copy_from_slice(&remaining[..n]);
            self.cursor += n;
            if self.cursor == bytes.len() {
                self.advance()?;
            }
            return Ok(n);
        }
    }
}
