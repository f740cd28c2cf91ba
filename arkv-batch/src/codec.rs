//! One batch per blob, encoded as an Arrow IPC stream.

use arkv_result::{Error, Result};
use arrow::ipc::reader::StreamReader;
use arrow::ipc::writer::StreamWriter;
use arrow::record_batch::RecordBatch;

/// Serialize `batch` into a self-describing IPC stream (schema + one batch).
pub fn encode_batch(batch: &RecordBatch) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut writer = StreamWriter::try_new(&mut buffer, &batch.schema())?;
    writer.write(batch)?;
    writer.finish()?;
    drop(writer);
    Ok(buffer)
}

/// Decode a blob produced by [`encode_batch`].
///
/// A stream with zero or several batches is a codec failure.
pub fn decode_batch(bytes: &[u8]) -> Result<RecordBatch> {
    let mut reader = StreamReader::try_new(bytes, None)?;
    let batch = match reader.next() {
        Some(batch) => batch?,
        None => return Err(Error::codec("stored blob contains no record batch")),
    };
    if reader.next().is_some() {
        return Err(Error::codec("stored blob contains more than one record batch"));
    }
    Ok(batch)
}
