//! Streaming many batches through one chunked IPC stream.

use std::sync::Arc;

use arkv_batch::{ChunkedBatchReader, ChunkedBatchWriter, ChunkedWriterConfig};
use arkv_result::Error;
use arkv_storage::{InstrumentedKvStore, KeySpace, MemKvStore};
use arkv_test_utils::{person_schema, random_people, vectorize_person};
use arrow::array::AsArray;
use arrow::datatypes::Int32Type;

fn config(rows_per_batch: usize, write_buffer_bytes: usize) -> ChunkedWriterConfig {
    ChunkedWriterConfig {
        rows_per_batch,
        write_buffer_bytes,
    }
}

#[test]
fn people_stream_round_trips_batch_by_batch() {
    arkv_test_utils::init_tracing_for_tests();
    let store = Arc::new(MemKvStore::new());
    let ks = KeySpace::named("people.arrow");
    let people = random_people(1_050, 3);

    let summary = ChunkedBatchWriter::new(Arc::clone(&store), ks.clone(), person_schema())
        .with_config(config(100, 4 * 1024))
        .write(&people, vectorize_person)
        .unwrap();
    assert_eq!(summary.rows, 1_050);
    assert_eq!(summary.batches, 11);
    assert!(summary.chunks > 1);

    let reader = ChunkedBatchReader::open(store, ks).unwrap();
    assert_eq!(reader.schema(), person_schema());
    let mut ages = Vec::new();
    let mut batches = 0;
    for batch in reader {
        let batch = batch.unwrap();
        assert!(batch.num_rows() <= 100);
        ages.extend(batch.column(2).as_primitive::<Int32Type>().values().iter().copied());
        batches += 1;
    }
    assert_eq!(batches, 11);
    assert_eq!(ages, people.iter().map(|p| p.age).collect::<Vec<_>>());
}

#[test]
fn rewriting_a_shorter_stream_drops_stale_chunks() {
    let mem = Arc::new(MemKvStore::new());
    let store = Arc::new(InstrumentedKvStore::new(Arc::clone(&mem)));
    let ks = KeySpace::named("s");
    let writer = ChunkedBatchWriter::new(Arc::clone(&store), ks.clone(), person_schema())
        .with_config(config(10, 1));

    let long = writer.write(&random_people(200, 1), vectorize_person).unwrap();
    let short = writer.write(&random_people(5, 2), vectorize_person).unwrap();
    assert!(short.chunks < long.chunks);
    assert_eq!(mem.len(), short.chunks as usize);

    let rows: usize = ChunkedBatchReader::open(store, ks)
        .unwrap()
        .map(|b| b.unwrap().num_rows())
        .sum();
    assert_eq!(rows, 5);
}

#[test]
fn empty_row_set_still_writes_a_schema() {
    let store = Arc::new(MemKvStore::new());
    let ks = KeySpace::named("empty");
    let summary = ChunkedBatchWriter::new(Arc::clone(&store), ks.clone(), person_schema())
        .write(&[], vectorize_person)
        .unwrap();
    assert_eq!(summary.batches, 0);

    let mut reader = ChunkedBatchReader::open(store, ks).unwrap();
    assert_eq!(reader.schema().fields().len(), 4);
    assert!(reader.next().is_none());
}

#[test]
fn missing_stream_is_not_found() {
    let store = Arc::new(MemKvStore::new());
    let res = ChunkedBatchReader::open(store, KeySpace::named("nope"));
    assert!(matches!(res, Err(Error::NotFound(_))));
}

#[test]
fn zero_rows_per_batch_is_rejected() {
    let store = Arc::new(MemKvStore::new());
    let res = ChunkedBatchWriter::new(store, KeySpace::root(), person_schema())
        .with_config(config(0, 1024))
        .write(&random_people(1, 0), vectorize_person);
    assert!(matches!(res, Err(Error::InvalidArgumentError(_))));
}
