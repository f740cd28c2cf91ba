//! Head pointer access.

use arkv_result::{Error, Result};
use arkv_storage::{BatchId, KeySpace, KvStore, MAX_BATCH_ID, decode_u32, encode_u32};

/// Current head pointer of the sequence in `keyspace`; `0` when absent.
pub fn load_head<S: KvStore>(store: &S, keyspace: &KeySpace) -> Result<BatchId> {
    let Some(raw) = store.find(&keyspace.head_key())? else {
        return Ok(0);
    };
    let head = decode_u32(raw.as_ref())?;
    if head > MAX_BATCH_ID {
        return Err(Error::Codec(format!(
            "head pointer {head} of {keyspace} exceeds the maximum batch id"
        )));
    }
    Ok(head)
}

/// Publish `head` as the head pointer of `keyspace`.
pub fn store_head<S: KvStore>(store: &S, keyspace: &KeySpace, head: BatchId) -> Result<()> {
    store.save(&keyspace.head_key(), &encode_u32(head))
}
