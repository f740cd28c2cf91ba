//! Grouped count / sum shared by concurrent batch consumers.

use std::sync::Mutex;

use arkv_result::{Error, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Int32Type};
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashMap;

use crate::path::column_by_path;
use crate::selection::SelectionSet;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Totals {
    count: u64,
    sum: i64,
}

/// One group of an [`AggregationState`].
#[derive(Clone, Debug, PartialEq)]
pub struct GroupAggregate {
    pub key: String,
    pub count: u64,
    pub sum: i64,
    pub average: f64,
}

/// Count and sum per text group key.
///
/// Internally synchronized: hand a shared reference to every worker of a
/// parallel read. Each [`aggregate`](Self::aggregate) call folds its batch
/// into a local map first and takes the lock once to merge.
#[derive(Debug, Default)]
pub struct AggregationState {
    groups: Mutex<FxHashMap<String, Totals>>,
}

impl AggregationState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, FxHashMap<String, Totals>>> {
        self.groups
            .lock()
            .map_err(|_| Error::Internal("aggregation state lock poisoned".into()))
    }

    /// Add the rows of `selection` to their groups.
    ///
    /// `group_path` must be a Utf8 column and `value_path` an Int32 column.
    /// Rows with a null group key or a null value are skipped.
    pub fn aggregate(
        &self,
        batch: &RecordBatch,
        group_path: &str,
        value_path: &str,
        selection: &SelectionSet,
    ) -> Result<()> {
        let groups = column_by_path(batch, group_path)?;
        let values = column_by_path(batch, value_path)?;
        if groups.data_type() != &DataType::Utf8 {
            return Err(Error::UnsupportedType(format!(
                "group column `{group_path}` must be Utf8, found {}",
                groups.data_type()
            )));
        }
        if values.data_type() != &DataType::Int32 {
            return Err(Error::UnsupportedType(format!(
                "value column `{value_path}` must be Int32, found {}",
                values.data_type()
            )));
        }
        let groups = groups.as_string::<i32>();
        let values = values.as_primitive::<Int32Type>();

        let mut local: FxHashMap<&str, Totals> = FxHashMap::default();
        for &row in selection.iter() {
            let row = row as usize;
            if row >= batch.num_rows() {
                return Err(Error::InvalidArgumentError(format!(
                    "selected row {row} out of bounds for batch of {} rows",
                    batch.num_rows()
                )));
            }
            if groups.is_null(row) || values.is_null(row) {
                continue;
            }
            let totals = local.entry(groups.value(row)).or_default();
            totals.count += 1;
            totals.sum += i64::from(values.value(row));
        }

        let mut shared = self.lock()?;
        for (key, totals) in local {
            let entry = shared.entry(key.to_owned()).or_default();
            entry.count += totals.count;
            entry.sum += totals.sum;
        }
        Ok(())
    }

    /// Fold every group of `other` into `self`.
    pub fn merge(&self, other: &AggregationState) -> Result<()> {
        let other = other.lock()?.clone();
        let mut shared = self.lock()?;
        for (key, totals) in other {
            let entry = shared.entry(key).or_default();
            entry.count += totals.count;
            entry.sum += totals.sum;
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<GroupAggregate>> {
        Ok(self.lock()?.get(key).map(|t| group(key.to_owned(), *t)))
    }

    pub fn count(&self, key: &str) -> Result<Option<u64>> {
        Ok(self.lock()?.get(key).map(|t| t.count))
    }

    pub fn sum(&self, key: &str) -> Result<Option<i64>> {
        Ok(self.lock()?.get(key).map(|t| t.sum))
    }

    pub fn average(&self, key: &str) -> Result<Option<f64>> {
        Ok(self.get(key)?.map(|g| g.average))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// All groups sorted by key.
    pub fn snapshot(&self) -> Result<Vec<GroupAggregate>> {
        let mut out: Vec<GroupAggregate> = self
            .lock()?
            .iter()
            .map(|(key, totals)| group(key.clone(), *totals))
            .collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(out)
    }
}

fn group(key: String, totals: Totals) -> GroupAggregate {
    GroupAggregate {
        key,
        count: totals.count,
        sum: totals.sum,
        average: totals.sum as f64 / totals.count as f64,
    }
}
