//! Batch sequence write / parallel read behaviour.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use arkv_batch::{BatchReader, BatchWriter, ReaderConfig, load_head};
use arkv_result::{Error, Result};
use arkv_storage::{KeySpace, KvStore, MemKvStore, SledStore};
use arkv_test_utils::{person_schema, random_people, vectorize_person};
use arkv_types::BatchBuilder;
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Field, Int32Type, Schema, SchemaRef};

fn int_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![Field::new("n", DataType::Int32, true)]))
}

fn write_int_batches<S: KvStore>(store: &Arc<S>, ks: &KeySpace, batches: usize) {
    let writer = BatchWriter::open(Arc::clone(store), ks.clone(), int_schema()).unwrap();
    for b in 0..batches {
        let rows: Vec<i32> = (0..10).map(|i| (b * 10 + i) as i32).collect();
        writer
            .write(&rows, |n, i, batch: &mut BatchBuilder| batch.set("n", i, *n))
            .unwrap();
    }
}

#[test]
fn head_pointer_equals_write_count_without_gaps() {
    arkv_test_utils::init_tracing_for_tests();
    let store = Arc::new(MemKvStore::new());
    let ks = KeySpace::root();
    write_int_batches(&store, &ks, 7);

    assert_eq!(load_head(store.as_ref(), &ks).unwrap(), 7);
    assert_eq!(&store.find(&[0, 0, 0, 0]).unwrap().unwrap()[..], &[0u8, 0, 0, 7]);
    for id in 1..=7 {
        assert!(store.find(&ks.key(id)).unwrap().is_some(), "missing blob {id}");
    }
    assert!(store.find(&ks.key(8)).unwrap().is_none());
}

#[test]
fn read_all_delivers_each_batch_exactly_once() {
    arkv_test_utils::init_tracing_for_tests();
    let store = Arc::new(MemKvStore::new());
    let ks = KeySpace::named("ints");
    write_int_batches(&store, &ks, 25);

    for workers in [1, 3, 8, 64] {
        let reader = BatchReader::open(Arc::clone(&store), ks.clone())
            .unwrap()
            .with_config(ReaderConfig::with_worker_threads(workers));
        let calls = AtomicUsize::new(0);
        let seen = Mutex::new(Vec::new());
        let delivered = reader
            .read_all(|batch| {
                calls.fetch_add(1, Ordering::Relaxed);
                let col = batch.column(0).as_primitive::<Int32Type>();
                seen.lock().unwrap().extend(col.values().iter().copied());
                Ok(())
            })
            .unwrap();

        assert_eq!(delivered, 25);
        assert_eq!(calls.load(Ordering::Relaxed), 25);
        let mut seen = seen.into_inner().unwrap();
        seen.sort_unstable();
        assert_eq!(seen, (0..250).collect::<Vec<i32>>());
    }
}

#[test]
fn empty_sequence_never_calls_consume() {
    let store = Arc::new(MemKvStore::new());
    let reader = BatchReader::open(store, KeySpace::root()).unwrap();
    assert_eq!(reader.head(), 0);
    let delivered = reader
        .read_all(|_| panic!("consume called on empty sequence"))
        .unwrap();
    assert_eq!(delivered, 0);
}

#[test]
fn reader_sees_a_snapshot_of_the_head() {
    let store = Arc::new(MemKvStore::new());
    let ks = KeySpace::root();
    write_int_batches(&store, &ks, 2);
    let reader = BatchReader::open(Arc::clone(&store), ks.clone()).unwrap();
    write_int_batches(&store, &ks, 3);

    assert_eq!(load_head(store.as_ref(), &ks).unwrap(), 5);
    assert_eq!(reader.read_all(|_| Ok(())).unwrap(), 2);
}

#[test]
fn failures_surface_after_siblings_complete() {
    arkv_test_utils::init_tracing_for_tests();
    let store = Arc::new(MemKvStore::new());
    let ks = KeySpace::root();
    write_int_batches(&store, &ks, 6);
    store.save(&ks.key(3), &[0xFF, 0xFF, 0xFF, 0xFF, 0x10, 0, 0, 0, 1, 2]).unwrap();
    store.delete(&ks.key(5)).unwrap();

    let reader = BatchReader::open(Arc::clone(&store), ks)
        .unwrap()
        .with_config(ReaderConfig::with_worker_threads(2));
    let calls = AtomicUsize::new(0);
    let err = reader
        .read_all(|_| {
            calls.fetch_add(1, Ordering::Relaxed);
            Ok(())
        })
        .unwrap_err();

    assert_eq!(calls.load(Ordering::Relaxed), 4);
    assert!(matches!(err, Error::Arrow(_) | Error::NotFound(_)), "{err:?}");
}

#[test]
fn missing_blob_below_head_is_not_found() {
    let store = Arc::new(MemKvStore::new());
    let ks = KeySpace::named("gappy");
    write_int_batches(&store, &ks, 5);
    store.delete(&ks.key(2)).unwrap();

    let reader = BatchReader::open(Arc::clone(&store), ks)
        .unwrap()
        .with_config(ReaderConfig::with_worker_threads(3));
    let calls = AtomicUsize::new(0);
    let err = reader
        .read_all(|_| {
            calls.fetch_add(1, Ordering::Relaxed);
            Ok(())
        })
        .unwrap_err();

    assert_eq!(calls.load(Ordering::Relaxed), 4);
    assert!(matches!(err, Error::NotFound(_)), "{err:?}");
    assert!(matches!(reader.read_batch(2), Err(Error::NotFound(_))));
}

/// Engine whose `save` fails for one armed key.
#[derive(Default)]
struct FailingSaves {
    inner: MemKvStore,
    fail_key: Mutex<Option<Vec<u8>>>,
}

impl FailingSaves {
    fn fail_saves_to(&self, key: Option<Vec<u8>>) {
        *self.fail_key.lock().unwrap() = key;
    }
}

impl KvStore for FailingSaves {
    type Blob = <MemKvStore as KvStore>::Blob;

    fn save(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if self.fail_key.lock().unwrap().as_deref() == Some(key) {
            return Err(Error::engine("injected save failure"));
        }
        self.inner.save(key, value)
    }

    fn find(&self, key: &[u8]) -> Result<Option<Self::Blob>> {
        self.inner.find(key)
    }

    fn delete(&self, key: &[u8]) -> Result<bool> {
        self.inner.delete(key)
    }
}

fn first_value<S: KvStore>(store: &Arc<S>, ks: &KeySpace, id: u32) -> i32 {
    let reader = BatchReader::open(Arc::clone(store), ks.clone()).unwrap();
    let batch = reader.read_batch(id).unwrap();
    batch.column(0).as_primitive::<Int32Type>().value(0)
}

#[test]
fn failed_data_save_leaves_head_and_keys_untouched() {
    let store = Arc::new(FailingSaves::default());
    let ks = KeySpace::named("flaky");
    let writer = BatchWriter::open(Arc::clone(&store), ks.clone(), int_schema()).unwrap();
    let set = |n: &i32, i: usize, b: &mut BatchBuilder| b.set("n", i, *n);
    writer.write(&[1], set).unwrap();
    writer.write(&[2], set).unwrap();

    store.fail_saves_to(Some(ks.key(3)));
    let err = writer.write(&[3], set).unwrap_err();
    assert!(matches!(err, Error::Engine(_)), "{err:?}");
    assert_eq!(writer.head().unwrap(), 2);
    assert_eq!(load_head(store.as_ref(), &ks).unwrap(), 2);
    assert!(store.find(&ks.key(3)).unwrap().is_none());

    store.fail_saves_to(None);
    assert_eq!(writer.write(&[4], set).unwrap(), 3);
    assert_eq!(first_value(&store, &ks, 3), 4);
}

#[test]
fn failed_head_save_leaves_an_orphan_that_the_next_write_replaces() {
    let store = Arc::new(FailingSaves::default());
    let ks = KeySpace::named("flaky");
    let writer = BatchWriter::open(Arc::clone(&store), ks.clone(), int_schema()).unwrap();
    let set = |n: &i32, i: usize, b: &mut BatchBuilder| b.set("n", i, *n);
    writer.write(&[10], set).unwrap();

    store.fail_saves_to(Some(ks.head_key()));
    assert!(matches!(writer.write(&[20], set), Err(Error::Engine(_))));
    assert_eq!(writer.head().unwrap(), 1);
    assert_eq!(load_head(store.as_ref(), &ks).unwrap(), 1);
    assert!(store.find(&ks.key(2)).unwrap().is_some(), "orphan blob expected");

    let reader = BatchReader::open(Arc::clone(&store), ks.clone()).unwrap();
    let calls = AtomicUsize::new(0);
    let delivered = reader
        .read_all(|_| {
            calls.fetch_add(1, Ordering::Relaxed);
            Ok(())
        })
        .unwrap();
    assert_eq!(delivered, 1);
    assert_eq!(calls.load(Ordering::Relaxed), 1);

    store.fail_saves_to(None);
    assert_eq!(writer.write(&[30], set).unwrap(), 2);
    assert_eq!(load_head(store.as_ref(), &ks).unwrap(), 2);
    assert_eq!(first_value(&store, &ks, 2), 30);
}

#[test]
fn consume_errors_propagate() {
    let store = Arc::new(MemKvStore::new());
    let ks = KeySpace::root();
    write_int_batches(&store, &ks, 4);

    let reader = BatchReader::open(store, ks).unwrap();
    let res: Result<usize> = reader.read_all(|batch| {
        let first = batch.column(0).as_primitive::<Int32Type>().value(0);
        if first == 20 {
            Err(Error::InvalidArgumentError("rejected".into()))
        } else {
            Ok(())
        }
    });
    assert!(matches!(res, Err(Error::InvalidArgumentError(_))));
}

#[test]
fn independent_sequences_keep_their_own_counters() {
    let store = Arc::new(MemKvStore::new());
    let a = KeySpace::named("a");
    let b = KeySpace::named("b");
    write_int_batches(&store, &a, 3);
    write_int_batches(&store, &b, 1);
    write_int_batches(&store, &a, 1);

    assert_eq!(load_head(store.as_ref(), &a).unwrap(), 4);
    assert_eq!(load_head(store.as_ref(), &b).unwrap(), 1);
}

#[test]
fn nested_people_round_trip_through_a_sequence() {
    let store = Arc::new(MemKvStore::new());
    let ks = KeySpace::named("people");
    let people = random_people(120, 5);
    let writer = BatchWriter::open(Arc::clone(&store), ks.clone(), person_schema()).unwrap();
    for window in people.chunks(50) {
        writer.write(window, vectorize_person).unwrap();
    }

    let reader = BatchReader::open(store, ks).unwrap();
    assert_eq!(reader.head(), 3);
    let batch = reader.read_batch(3).unwrap();
    assert_eq!(batch.num_rows(), 20);
    let city = batch.column(3).as_struct().column_by_name("city").unwrap();
    assert_eq!(city.as_string::<i32>().value(0), people[100].address.city);
    assert_eq!(city.null_count(), 0);
}

#[test]
fn sequence_survives_reopening_a_sled_store() {
    let dir = tempfile::tempdir().unwrap();
    let ks = KeySpace::named("durable");
    {
        let store = Arc::new(SledStore::open(dir.path()).unwrap());
        write_int_batches(&store, &ks, 3);
    }

    let store = Arc::new(SledStore::open(dir.path()).unwrap());
    let reader = BatchReader::open(Arc::clone(&store), ks.clone()).unwrap();
    assert_eq!(reader.head(), 3);
    let rows = AtomicUsize::new(0);
    reader
        .read_all(|batch| {
            rows.fetch_add(batch.num_rows(), Ordering::Relaxed);
            Ok(())
        })
        .unwrap();
    assert_eq!(rows.into_inner(), 30);

    write_int_batches(&store, &ks, 1);
    assert_eq!(load_head(store.as_ref(), &ks).unwrap(), 4);
}
