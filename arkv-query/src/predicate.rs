//! Column predicates producing selection sets.
//!
//! Null cells never match.

use arkv_result::{Error, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Int32Type};
use arrow::record_batch::RecordBatch;

use crate::path::column_by_path;
use crate::selection::SelectionSet;

fn require_utf8(array: &dyn Array, op: &str) -> Result<()> {
    match array.data_type() {
        DataType::Utf8 => Ok(()),
        other => Err(Error::UnsupportedType(format!(
            "{op} needs a Utf8 column, found {other}"
        ))),
    }
}

fn select_text(array: &dyn Array, op: &str, keep: impl Fn(&[u8]) -> bool) -> Result<SelectionSet> {
    require_utf8(array, op)?;
    let strings = array.as_string::<i32>();
    let rows = strings
        .iter()
        .enumerate()
        .filter_map(|(row, value)| match value {
            Some(v) if keep(v.as_bytes()) => Some(row as u32),
            _ => None,
        })
        .collect();
    Ok(SelectionSet::from_ascending(rows))
}

/// Rows whose text starts with `prefix`.
pub fn prefix_match(array: &dyn Array, prefix: &[u8]) -> Result<SelectionSet> {
    select_text(array, "prefix match", |v| v.starts_with(prefix))
}

/// Rows whose text ends with `suffix`.
pub fn suffix_match(array: &dyn Array, suffix: &[u8]) -> Result<SelectionSet> {
    select_text(array, "suffix match", |v| v.ends_with(suffix))
}

/// Rows whose text equals `value` byte for byte.
pub fn equal_match(array: &dyn Array, value: &[u8]) -> Result<SelectionSet> {
    select_text(array, "equality match", |v| v == value)
}

/// Rows with `low <= value <= high`.
pub fn int_range_match(array: &dyn Array, low: i32, high: i32) -> Result<SelectionSet> {
    if array.data_type() != &DataType::Int32 {
        return Err(Error::UnsupportedType(format!(
            "range match needs an Int32 column, found {}",
            array.data_type()
        )));
    }
    let ints = array.as_primitive::<Int32Type>();
    let rows = ints
        .iter()
        .enumerate()
        .filter_map(|(row, value)| match value {
            Some(v) if (low..=high).contains(&v) => Some(row as u32),
            _ => None,
        })
        .collect();
    Ok(SelectionSet::from_ascending(rows))
}

/// A predicate bound to a column path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    Prefix { column: String, prefix: Vec<u8> },
    Suffix { column: String, suffix: Vec<u8> },
    Equals { column: String, value: Vec<u8> },
    IntRange { column: String, low: i32, high: i32 },
}

impl Filter {
    pub fn prefix(column: impl Into<String>, prefix: impl Into<Vec<u8>>) -> Self {
        Filter::Prefix {
            column: column.into(),
            prefix: prefix.into(),
        }
    }

    pub fn suffix(column: impl Into<String>, suffix: impl Into<Vec<u8>>) -> Self {
        Filter::Suffix {
            column: column.into(),
            suffix: suffix.into(),
        }
    }

    pub fn equals(column: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Filter::Equals {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn int_range(column: impl Into<String>, low: i32, high: i32) -> Self {
        Filter::IntRange {
            column: column.into(),
            low,
            high,
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Prefix { column, .. }
            | Filter::Suffix { column, .. }
            | Filter::Equals { column, .. }
            | Filter::IntRange { column, .. } => column,
        }
    }

    pub fn evaluate(&self, batch: &RecordBatch) -> Result<SelectionSet> {
        let array = column_by_path(batch, self.column())?;
        match self {
            Filter::Prefix { prefix, .. } => prefix_match(array.as_ref(), prefix),
            Filter::Suffix { suffix, .. } => suffix_match(array.as_ref(), suffix),
            Filter::Equals { value, .. } => equal_match(array.as_ref(), value),
            Filter::IntRange { low, high, .. } => int_range_match(array.as_ref(), *low, *high),
        }
    }
}

/// Evaluate `filters` and intersect their selections left to right. No
/// filters selects every row.
pub fn select_all(batch: &RecordBatch, filters: &[Filter]) -> Result<SelectionSet> {
    let mut filters = filters.iter();
    let Some(first) = filters.next() else {
        return Ok(SelectionSet::all(batch.num_rows()));
    };
    let mut selection = first.evaluate(batch)?;
    for filter in filters {
        selection = selection.intersect(&filter.evaluate(batch)?);
    }
    Ok(selection)
}
