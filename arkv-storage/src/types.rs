//! Key layout shared by batch sequences and chunked streams.

use std::fmt;

use arkv_result::{Error, Result};

/// Integer id of a stored blob or chunk inside a [`KeySpace`].
pub type BatchId = u32;

/// Id reserved for a batch sequence's head pointer.
pub const HEAD_POINTER_ID: BatchId = 0;

/// Largest id a batch sequence may allocate.
pub const MAX_BATCH_ID: BatchId = 0x7FFF_FFFF;

/// Encode `value` as the 4-byte big-endian form used for keys and pointers.
#[inline]
pub fn encode_u32(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Decode a 4-byte big-endian integer, rejecting any other width.
pub fn decode_u32(bytes: &[u8]) -> Result<u32> {
    let raw: [u8; 4] = bytes.try_into().map_err(|_| {
        Error::Codec(format!(
            "expected a 4-byte big-endian integer, found {} bytes",
            bytes.len()
        ))
    })?;
    Ok(u32::from_be_bytes(raw))
}

/// Namespace for the integer-keyed entries of one batch sequence or stream.
///
/// A key is `prefix ‖ be_u32(id)`. The root keyspace has an empty prefix, so
/// its head pointer lives at `0x00000000` and its blobs at `0x00000001..`.
/// Two sequences with different prefixes never share a key, which is what
/// lets each sequence own its own id counter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeySpace {
    prefix: Vec<u8>,
}

impl KeySpace {
    /// Keyspace with no prefix.
    pub fn root() -> Self {
        Self::default()
    }

    /// Keyspace using `prefix` verbatim.
    pub fn with_prefix(prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Keyspace derived from a human-readable sequence name (`"{name}/"`).
    pub fn named(name: &str) -> Self {
        let mut prefix = Vec::with_capacity(name.len() + 1);
        prefix.extend_from_slice(name.as_bytes());
        prefix.push(b'/');
        Self { prefix }
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Physical key for `id`.
    pub fn key(&self, id: BatchId) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.prefix.len() + 4);
        key.extend_from_slice(&self.prefix);
        key.extend_from_slice(&encode_u32(id));
        key
    }

    /// Physical key of the head pointer.
    pub fn head_key(&self) -> Vec<u8> {
        self.key(HEAD_POINTER_ID)
    }
}

impl fmt::Display for KeySpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            f.write_str("<root>")
        } else {
            write!(f, "{}", String::from_utf8_lossy(&self.prefix))
        }
    }
}
