//! Synthetic people analytics: write a batch sequence, then filter and
//! group it in parallel.
//!
//! The query keeps people living on a street ending in "way" whose last
//! name starts with "P" and whose age is in `[18, 35]`, and reports the
//! average age per city. The same rows are also written as one chunked
//! stream and aggregated sequentially, which must agree with the parallel
//! result.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use arkv_batch::{
    BatchReader, BatchWriter, ChunkedBatchReader, ChunkedBatchWriter, ChunkedWriteSummary,
    ChunkedWriterConfig, ReaderConfig,
};
use arkv_query::{AggregationState, Filter, GroupAggregate, GroupedQuery};
use arkv_result::{Error, Result};
use arkv_storage::{KeySpace, KvStore};
use arkv_datagen::{person_schema, random_people, vectorize_person};

pub const SEQUENCE_NAME: &str = "people";
pub const STREAM_NAME: &str = "people.arrow";

#[derive(Clone, Copy, Debug)]
pub struct PeopleOptions {
    pub count: usize,
    pub rows_per_batch: usize,
    pub seed: u64,
    pub reader: ReaderConfig,
}

impl Default for PeopleOptions {
    fn default() -> Self {
        Self {
            count: 100_000,
            rows_per_batch: ChunkedWriterConfig::default().rows_per_batch,
            seed: 42,
            reader: ReaderConfig::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PeopleReport {
    /// Batches visible to the parallel reader, including earlier runs.
    pub batches: u32,
    pub rows_written: usize,
    pub matched: usize,
    pub groups: Vec<GroupAggregate>,
    pub stream: ChunkedWriteSummary,
    pub write_elapsed: Duration,
    pub read_elapsed: Duration,
}

pub fn people_query() -> GroupedQuery {
    GroupedQuery::new("address.city", "age")
        .filter(Filter::suffix("address.street", "way"))
        .filter(Filter::prefix("lastName", "P"))
        .filter(Filter::int_range("age", 18, 35))
}

pub fn run_people<S: KvStore>(store: Arc<S>, options: &PeopleOptions) -> Result<PeopleReport> {
    if options.rows_per_batch == 0 {
        return Err(Error::InvalidArgumentError(
            "rows per batch must be at least 1".into(),
        ));
    }
    let people = random_people(options.count, options.seed);
    let query = people_query();

    let started = Instant::now();
    let writer = BatchWriter::open(
        Arc::clone(&store),
        KeySpace::named(SEQUENCE_NAME),
        person_schema(),
    )?;
    for window in people.chunks(options.rows_per_batch) {
        writer.write(window, vectorize_person)?;
    }
    let stream = ChunkedBatchWriter::new(
        Arc::clone(&store),
        KeySpace::named(STREAM_NAME),
        person_schema(),
    )
    .with_config(ChunkedWriterConfig {
        rows_per_batch: options.rows_per_batch,
        ..ChunkedWriterConfig::default()
    })
    .write(&people, vectorize_person)?;
    let write_elapsed = started.elapsed();
    tracing::info!(rows = people.len(), ?write_elapsed, "people written");

    let started = Instant::now();
    let reader = BatchReader::open(Arc::clone(&store), KeySpace::named(SEQUENCE_NAME))?
        .with_config(options.reader);
    let state = AggregationState::new();
    let matched = AtomicUsize::new(0);
    reader.read_all(|batch| {
        let hits = query.apply(&batch, &state)?;
        matched.fetch_add(hits, Ordering::Relaxed);
        Ok(())
    })?;
    let read_elapsed = started.elapsed();

    // The stream holds exactly this run's rows; the sequence may hold more.
    let streamed = AggregationState::new();
    for batch in ChunkedBatchReader::open(Arc::clone(&store), KeySpace::named(STREAM_NAME))? {
        query.apply(&batch?, &streamed)?;
    }
    if reader.head() as usize == people.len().div_ceil(options.rows_per_batch)
        && streamed.snapshot()? != state.snapshot()?
    {
        return Err(Error::Internal(
            "sequential stream and parallel sequence disagree".into(),
        ));
    }

    Ok(PeopleReport {
        batches: reader.head(),
        rows_written: people.len(),
        matched: matched.into_inner(),
        groups: state.snapshot()?,
        stream,
        write_elapsed,
        read_elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arkv_storage::MemKvStore;

    #[test]
    fn small_run_reports_every_city_group() {
        let store = Arc::new(MemKvStore::new());
        let options = PeopleOptions {
            count: 2_000,
            rows_per_batch: 300,
            ..PeopleOptions::default()
        };
        let report = run_people(store, &options).unwrap();
        assert_eq!(report.batches, 7);
        assert_eq!(report.stream.batches, 7);
        let counted: u64 = report.groups.iter().map(|g| g.count).sum();
        assert_eq!(counted as usize, report.matched);
        assert!(report.groups.windows(2).all(|w| w[0].key < w[1].key));
    }
}
