use arkv_result::Result;
use arrow::record_batch::RecordBatch;

use crate::aggregate::AggregationState;
use crate::predicate::{Filter, select_all};

/// Filter chain plus a grouped aggregation, applied batch by batch.
///
/// Meant to be called from a parallel reader's consumer; `apply` only needs
/// `&self` and a shared [`AggregationState`].
#[derive(Clone, Debug)]
pub struct GroupedQuery {
    pub filters: Vec<Filter>,
    pub group_by: String,
    pub value: String,
}

impl GroupedQuery {
    pub fn new(group_by: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            filters: Vec::new(),
            group_by: group_by.into(),
            value: value.into(),
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Fold the matching rows of `batch` into `state`. Returns how many rows
    /// matched the filters.
    pub fn apply(&self, batch: &RecordBatch, state: &AggregationState) -> Result<usize> {
        let selection = select_all(batch, &self.filters)?;
        state.aggregate(batch, &self.group_by, &self.value, &selection)?;
        Ok(selection.len())
    }
}
