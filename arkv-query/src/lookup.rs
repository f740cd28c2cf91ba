//! Equality point lookup with whole-row projection.

use std::fmt;

use arkv_result::Result;
use arkv_types::{CellValue, cell_at};
use arrow::array::{Array, AsArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::path::column_by_path;
use crate::predicate::equal_match;

/// One projected row: `(field path, value)` pairs in schema order with
/// null cells left out. Struct children appear as `parent.child`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn cells(&self) -> &[(String, CellValue)] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.cells {
            writeln!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}

/// Rows of `batch` whose Utf8 column `field` equals `value` byte for byte.
///
/// Non-text target columns fail with `UnsupportedType`.
pub fn find_equal(batch: &RecordBatch, field: &str, value: &[u8]) -> Result<Vec<Row>> {
    let target = column_by_path(batch, field)?;
    let matches = equal_match(target.as_ref(), value)?;
    tracing::trace!(field, rows = batch.num_rows(), hits = matches.len(), "point lookup");

    matches
        .iter()
        .map(|&row| project_row(batch, row as usize))
        .collect()
}

/// Every non-null cell of `row`.
pub fn project_row(batch: &RecordBatch, row: usize) -> Result<Row> {
    let mut cells = Vec::new();
    for (field, column) in batch.schema().fields().iter().zip(batch.columns()) {
        project_cell(field.name(), column.as_ref(), row, &mut cells)?;
    }
    Ok(Row { cells })
}

fn project_cell(
    name: &str,
    array: &dyn Array,
    row: usize,
    out: &mut Vec<(String, CellValue)>,
) -> Result<()> {
    if array.is_null(row) {
        return Ok(());
    }
    if let DataType::Struct(fields) = array.data_type() {
        let children = array.as_struct();
        for (child_field, child) in fields.iter().zip(children.columns()) {
            let path = format!("{name}.{}", child_field.name());
            project_cell(&path, child.as_ref(), row, out)?;
        }
        return Ok(());
    }
    if let Some(cell) = cell_at(array, row)? {
        out.push((name.to_owned(), cell));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arkv_result::Error;
    use arkv_types::BatchBuilder;
    use arrow::datatypes::{Field, Fields, Schema};
    use std::sync::Arc;

    fn sample() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("foo", DataType::Utf8, true),
            Field::new("enable", DataType::Boolean, true),
            Field::new("index", DataType::Int32, true),
            Field::new(
                "address",
                DataType::Struct(Fields::from(vec![Field::new("city", DataType::Utf8, true)])),
                true,
            ),
        ]));
        let mut b = BatchBuilder::new(&schema).unwrap();
        b.set("foo", 0, "bar").unwrap();
        b.set("enable", 0, true).unwrap();
        b.set("index", 0, 42).unwrap();
        b.set("address.city", 0, "Paris").unwrap();
        b.set("foo", 1, "baz").unwrap();
        b.set("foo", 2, "bar").unwrap();
        b.finish(3).unwrap()
    }

    #[test]
    fn projects_matching_rows_without_nulls() {
        let rows = find_equal(&sample(), "foo", b"bar").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("enable"), Some(&CellValue::Boolean(true)));
        assert_eq!(rows[0].get("index"), Some(&CellValue::Int32(42)));
        assert_eq!(rows[0].get("address.city"), Some(&CellValue::from("Paris")));
        assert_eq!(rows[1].len(), 1);
        assert_eq!(rows[0].to_string(), "foo: bar\nenable: true\nindex: 42\naddress.city: Paris\n");
    }

    #[test]
    fn lookup_by_nested_path() {
        let rows = find_equal(&sample(), "address.city", b"Paris").unwrap();
        assert_eq!(rows.len(), 1);
        assert!(find_equal(&sample(), "foo", b"qux").unwrap().is_empty());
    }

    #[test]
    fn non_text_target_is_unsupported() {
        assert!(matches!(
            find_equal(&sample(), "index", b"42"),
            Err(Error::UnsupportedType(_))
        ));
        assert!(matches!(
            find_equal(&sample(), "missing", b"x"),
            Err(Error::NotFound(_))
        ));
    }
}
