//! Row-index-addressed batch assembly.

use std::sync::Arc;

use arkv_result::{Error, Result};
use arrow::datatypes::{Field, FieldRef, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::cell::CellValue;
use crate::column::ColumnVector;

/// Mutable batch under construction.
///
/// Vectorize callbacks write one row at a time with [`BatchBuilder::set`],
/// addressing fields by name or dotted path (`"address.city"`). Columns grow
/// on demand; [`BatchBuilder::finish`] pads every column with nulls to the
/// final row count and produces an immutable [`RecordBatch`].
#[derive(Clone, Debug)]
pub struct BatchBuilder {
    fields: Vec<FieldRef>,
    columns: Vec<ColumnVector>,
}

impl BatchBuilder {
    /// Empty builder for `schema`.
    pub fn new(schema: &SchemaRef) -> Result<Self> {
        Self::with_capacity(schema, 0)
    }

    /// Empty builder with room for `rows` rows in every column.
    pub fn with_capacity(schema: &SchemaRef, rows: usize) -> Result<Self> {
        let fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
        let columns = fields
            .iter()
            .map(|f| {
                let mut col = ColumnVector::for_data_type(f.data_type())?;
                col.reserve(rows);
                Ok(col)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { fields, columns })
    }

    /// Builder pre-filled with the contents of `batch`.
    pub fn from_batch(batch: &RecordBatch) -> Result<Self> {
        let fields: Vec<FieldRef> = batch.schema().fields().iter().cloned().collect();
        let columns = batch
            .columns()
            .iter()
            .map(|array| ColumnVector::from_array(array.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { fields, columns })
    }

    /// Schema of the batch as it currently stands.
    pub fn schema(&self) -> SchemaRef {
        Arc::new(Schema::new(self.fields.clone()))
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Longest column length, i.e. the smallest row count `finish` accepts.
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(ColumnVector::len).max().unwrap_or(0)
    }

    /// Index of the top-level field named `name`.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    /// Top-level field named `name`.
    pub fn field(&self, name: &str) -> Option<&FieldRef> {
        self.field_index(name).map(|idx| &self.fields[idx])
    }

    /// Column at `path`. A literal top-level name wins over a dotted path.
    pub fn column_mut(&mut self, path: &str) -> Result<&mut ColumnVector> {
        if let Some(idx) = self.field_index(path) {
            return Ok(&mut self.columns[idx]);
        }
        let mut segments = path.split('.');
        let head = segments.next().unwrap_or(path);
        let idx = self
            .field_index(head)
            .ok_or_else(|| Error::NotFound(format!("field `{path}`")))?;
        let mut column = &mut self.columns[idx];
        for segment in segments {
            column = column
                .child_mut(segment)
                .ok_or_else(|| Error::NotFound(format!("field `{path}`")))?;
        }
        Ok(column)
    }

    /// Write `value` at row `index` of the column at `path`.
    pub fn set(&mut self, path: &str, index: usize, value: impl Into<CellValue>) -> Result<()> {
        self.column_mut(path)?.set(index, value.into())
    }

    /// Write `value` or a null at row `index` of the column at `path`.
    pub fn set_opt(&mut self, path: &str, index: usize, value: Option<CellValue>) -> Result<()> {
        let column = self.column_mut(path)?;
        match value {
            Some(value) => column.set(index, value),
            None => {
                column.set_null(index);
                Ok(())
            }
        }
    }

    /// Append a new top-level column. Fails if the name is taken.
    pub fn add_column(&mut self, field: Field) -> Result<&mut ColumnVector> {
        if self.field_index(field.name()).is_some() {
            return Err(Error::InvalidArgumentError(format!(
                "field `{}` already exists",
                field.name()
            )));
        }
        let column = ColumnVector::for_data_type(field.data_type())?;
        self.fields.push(Arc::new(field));
        self.columns.push(column);
        let last = self.columns.len() - 1;
        Ok(&mut self.columns[last])
    }

    /// Pad every column to `row_count` and build the batch.
    pub fn finish(mut self, row_count: usize) -> Result<RecordBatch> {
        let longest = self.row_count();
        if longest > row_count {
            return Err(Error::InvalidArgumentError(format!(
                "row count {row_count} is smaller than the longest column ({longest} rows)"
            )));
        }
        let arrays = self
            .columns
            .iter_mut()
            .map(|column| {
                column.resize(row_count);
                column.to_array()
            })
            .collect::<Result<Vec<_>>>()?;
        let options = RecordBatchOptions::new().with_row_count(Some(row_count));
        let schema = Arc::new(Schema::new(self.fields));
        Ok(RecordBatch::try_new_with_options(schema, arrays, &options)?)
    }
}
