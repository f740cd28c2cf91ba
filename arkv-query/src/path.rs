use arkv_result::{Error, Result};
use arrow::array::{Array, ArrayRef, AsArray, make_array};
use arrow::buffer::NullBuffer;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

/// Column named `path`, descending into struct columns on `.`.
///
/// A literal top-level field name wins over a dotted interpretation. A
/// child reached through a struct inherits the struct's nulls, so a row
/// whose parent struct is null reads as null in every nested column.
pub fn column_by_path(batch: &RecordBatch, path: &str) -> Result<ArrayRef> {
    if let Some(column) = batch.column_by_name(path) {
        return Ok(column.clone());
    }
    let not_found = || Error::NotFound(format!("field `{path}`"));

    let mut segments = path.split('.');
    let head = segments.next().ok_or_else(not_found)?;
    let mut column = batch.column_by_name(head).ok_or_else(not_found)?.clone();
    for segment in segments {
        if !matches!(column.data_type(), DataType::Struct(_)) {
            return Err(not_found());
        }
        let parent = column.as_struct();
        let child = parent.column_by_name(segment).ok_or_else(not_found)?;
        column = inherit_nulls(child, parent.nulls())?;
    }
    Ok(column)
}

fn inherit_nulls(child: &ArrayRef, parent: Option<&NullBuffer>) -> Result<ArrayRef> {
    if parent.is_none() {
        return Ok(child.clone());
    }
    let nulls = NullBuffer::union(parent, child.nulls());
    let data = child.to_data().into_builder().nulls(nulls).build()?;
    Ok(make_array(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int32Array, StringArray, StructArray};
    use arrow::datatypes::{Field, Fields, Schema};
    use std::sync::Arc;

    fn nested_batch() -> RecordBatch {
        let fields = Fields::from(vec![Field::new("city", DataType::Utf8, true)]);
        let city: ArrayRef = Arc::new(StringArray::from(vec!["Paris", "London", "Rome"]));
        let address = StructArray::try_new(
            fields.clone(),
            vec![city],
            Some(NullBuffer::from(vec![true, false, true])),
        )
        .unwrap();
        let schema = Arc::new(Schema::new(vec![
            Field::new("age", DataType::Int32, true),
            Field::new("address", DataType::Struct(fields), true),
            Field::new("a.b", DataType::Int32, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int32Array::from(vec![1, 2, 3])),
                Arc::new(address),
                Arc::new(Int32Array::from(vec![7, 8, 9])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn resolves_nested_children_with_parent_nulls() {
        let batch = nested_batch();
        let city = column_by_path(&batch, "address.city").unwrap();
        assert_eq!(city.as_string::<i32>().value(0), "Paris");
        assert!(city.is_null(1));
        assert!(city.is_valid(2));
    }

    #[test]
    fn literal_names_win_and_misses_are_not_found() {
        let batch = nested_batch();
        assert_eq!(column_by_path(&batch, "a.b").unwrap().len(), 3);
        assert!(matches!(column_by_path(&batch, "age.x"), Err(Error::NotFound(_))));
        assert!(matches!(
            column_by_path(&batch, "address.zip"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(column_by_path(&batch, "nope"), Err(Error::NotFound(_))));
    }
}
