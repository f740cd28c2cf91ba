//! Growable, index-addressable column vectors.
//!
//! A [`ColumnVector`] is the mutable counterpart of an Arrow leaf array while
//! a batch is being filled: cells are written at arbitrary row indices and
//! the vector grows (padding with nulls) to cover them. The closed set of
//! variants is matched exhaustively everywhere a cell is read or written.

use std::sync::Arc;

use arkv_result::{Error, Result};
use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Decimal128Array, Int32Array, StringArray, StructArray,
};
use arrow::buffer::NullBuffer;
use arrow::datatypes::{DataType, Decimal128Type, Fields, Int32Type};

use crate::cell::CellValue;
use crate::decimal::DecimalValue;

#[derive(Clone, Debug, PartialEq)]
pub struct DecimalColumn {
    pub precision: u8,
    pub scale: i8,
    pub values: Vec<Option<i128>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructColumn {
    pub fields: Fields,
    pub children: Vec<ColumnVector>,
    /// `false` marks a null struct row; new rows start valid.
    pub validity: Vec<bool>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ColumnVector {
    Boolean(Vec<Option<bool>>),
    Int32(Vec<Option<i32>>),
    Utf8(Vec<Option<String>>),
    Decimal(DecimalColumn),
    Struct(StructColumn),
}

impl ColumnVector {
    /// Empty vector for `data_type`, or `UnsupportedType`.
    pub fn for_data_type(data_type: &DataType) -> Result<Self> {
        Ok(match data_type {
            DataType::Boolean => ColumnVector::Boolean(Vec::new()),
            DataType::Int32 => ColumnVector::Int32(Vec::new()),
            DataType::Utf8 => ColumnVector::Utf8(Vec::new()),
            DataType::Decimal128(precision, scale) => ColumnVector::Decimal(DecimalColumn {
                precision: *precision,
                scale: *scale,
                values: Vec::new(),
            }),
            DataType::Struct(fields) => ColumnVector::Struct(StructColumn {
                fields: fields.clone(),
                children: fields
                    .iter()
                    .map(|f| ColumnVector::for_data_type(f.data_type()))
                    .collect::<Result<Vec<_>>>()?,
                validity: Vec::new(),
            }),
            other => {
                return Err(Error::UnsupportedType(format!(
                    "no column vector for {other}"
                )));
            }
        })
    }

    /// Decode an Arrow array into an owned vector.
    pub fn from_array(array: &dyn Array) -> Result<Self> {
        Ok(match array.data_type() {
            DataType::Boolean => ColumnVector::Boolean(array.as_boolean().iter().collect()),
            DataType::Int32 => {
                ColumnVector::Int32(array.as_primitive::<Int32Type>().iter().collect())
            }
            DataType::Utf8 => ColumnVector::Utf8(
                array
                    .as_string::<i32>()
                    .iter()
                    .map(|v| v.map(str::to_owned))
                    .collect(),
            ),
            DataType::Decimal128(precision, scale) => ColumnVector::Decimal(DecimalColumn {
                precision: *precision,
                scale: *scale,
                values: array.as_primitive::<Decimal128Type>().iter().collect(),
            }),
            DataType::Struct(fields) => {
                let structs = array.as_struct();
                ColumnVector::Struct(StructColumn {
                    fields: fields.clone(),
                    children: structs
                        .columns()
                        .iter()
                        .map(|c| ColumnVector::from_array(c.as_ref()))
                        .collect::<Result<Vec<_>>>()?,
                    validity: (0..structs.len()).map(|i| structs.is_valid(i)).collect(),
                })
            }
            other => {
                return Err(Error::UnsupportedType(format!(
                    "cannot decode a {other} column"
                )));
            }
        })
    }

    pub fn data_type(&self) -> DataType {
        match self {
            ColumnVector::Boolean(_) => DataType::Boolean,
            ColumnVector::Int32(_) => DataType::Int32,
            ColumnVector::Utf8(_) => DataType::Utf8,
            ColumnVector::Decimal(d) => DataType::Decimal128(d.precision, d.scale),
            ColumnVector::Struct(s) => DataType::Struct(s.fields.clone()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnVector::Boolean(v) => v.len(),
            ColumnVector::Int32(v) => v.len(),
            ColumnVector::Utf8(v) => v.len(),
            ColumnVector::Decimal(d) => d.values.len(),
            ColumnVector::Struct(s) => s.validity.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grow (padding with nulls) or truncate to exactly `len` rows.
    pub fn resize(&mut self, len: usize) {
        match self {
            ColumnVector::Boolean(v) => v.resize(len, None),
            ColumnVector::Int32(v) => v.resize(len, None),
            ColumnVector::Utf8(v) => v.resize(len, None),
            ColumnVector::Decimal(d) => d.values.resize(len, None),
            ColumnVector::Struct(s) => {
                s.validity.resize(len, true);
                for child in &mut s.children {
                    child.resize(len);
                }
            }
        }
    }

    pub fn reserve(&mut self, additional: usize) {
        match self {
            ColumnVector::Boolean(v) => v.reserve(additional),
            ColumnVector::Int32(v) => v.reserve(additional),
            ColumnVector::Utf8(v) => v.reserve(additional),
            ColumnVector::Decimal(d) => d.values.reserve(additional),
            ColumnVector::Struct(s) => {
                s.validity.reserve(additional);
                for child in &mut s.children {
                    child.reserve(additional);
                }
            }
        }
    }

    /// Write `value` at `index`, growing the vector to `index + 1` if needed.
    ///
    /// Int32 values are widened into Decimal columns; decimals are rescaled
    /// (half away from zero) to the column's scale and must fit its
    /// precision. Any other mismatch is `UnsupportedType`.
    pub fn set(&mut self, index: usize, value: CellValue) -> Result<()> {
        let type_name = self.type_name();
        if index >= self.len() {
            self.resize(index + 1);
        }
        match (self, value) {
            (ColumnVector::Boolean(v), CellValue::Boolean(x)) => v[index] = Some(x),
            (ColumnVector::Int32(v), CellValue::Int32(x)) => v[index] = Some(x),
            (ColumnVector::Utf8(v), CellValue::Utf8(x)) => v[index] = Some(x),
            (ColumnVector::Decimal(d), CellValue::Decimal(x)) => {
                d.values[index] = Some(fit_decimal(x, d.precision, d.scale)?);
            }
            (ColumnVector::Decimal(d), CellValue::Int32(x)) => {
                let widened = DecimalValue::new(i128::from(x), 0)?;
                d.values[index] = Some(fit_decimal(widened, d.precision, d.scale)?);
            }
            (ColumnVector::Struct(_), value) => {
                return Err(Error::UnsupportedType(format!(
                    "cannot store {} directly in a struct column; write its child fields",
                    value.type_name()
                )));
            }
            (_, value) => {
                return Err(Error::UnsupportedType(format!(
                    "cannot store {} in a {type_name} column",
                    value.type_name()
                )));
            }
        }
        Ok(())
    }

    /// Null out `index`, growing the vector if needed.
    pub fn set_null(&mut self, index: usize) {
        if index >= self.len() {
            self.resize(index + 1);
        }
        match self {
            ColumnVector::Boolean(v) => v[index] = None,
            ColumnVector::Int32(v) => v[index] = None,
            ColumnVector::Utf8(v) => v[index] = None,
            ColumnVector::Decimal(d) => d.values[index] = None,
            ColumnVector::Struct(s) => s.validity[index] = false,
        }
    }

    /// Cell at `index`; `None` for nulls, out-of-range rows and struct rows.
    ///
    /// Fails when a stored decimal is invalid for the column's scale.
    pub fn get(&self, index: usize) -> Result<Option<CellValue>> {
        Ok(match self {
            ColumnVector::Boolean(v) => v.get(index).copied().flatten().map(CellValue::Boolean),
            ColumnVector::Int32(v) => v.get(index).copied().flatten().map(CellValue::Int32),
            ColumnVector::Utf8(v) => v.get(index).cloned().flatten().map(CellValue::Utf8),
            ColumnVector::Decimal(d) => match d.values.get(index).copied().flatten() {
                Some(raw) => Some(CellValue::Decimal(DecimalValue::new(raw, d.scale)?)),
                None => None,
            },
            ColumnVector::Struct(_) => None,
        })
    }

    /// Child vector of a struct column.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut ColumnVector> {
        match self {
            ColumnVector::Struct(s) => {
                let idx = s.fields.iter().position(|f| f.name() == name)?;
                s.children.get_mut(idx)
            }
            ColumnVector::Boolean(_)
            | ColumnVector::Int32(_)
            | ColumnVector::Utf8(_)
            | ColumnVector::Decimal(_) => None,
        }
    }

    /// Build the Arrow array for the current contents.
    pub fn to_array(&self) -> Result<ArrayRef> {
        Ok(match self {
            ColumnVector::Boolean(v) => Arc::new(BooleanArray::from(v.clone())),
            ColumnVector::Int32(v) => Arc::new(Int32Array::from(v.clone())),
            ColumnVector::Utf8(v) => {
                Arc::new(v.iter().map(|s| s.as_deref()).collect::<StringArray>())
            }
            ColumnVector::Decimal(d) => Arc::new(
                Decimal128Array::from(d.values.clone())
                    .with_precision_and_scale(d.precision, d.scale)?,
            ),
            ColumnVector::Struct(s) => {
                let children = s
                    .children
                    .iter()
                    .map(ColumnVector::to_array)
                    .collect::<Result<Vec<_>>>()?;
                let nulls = if s.validity.iter().all(|v| *v) {
                    None
                } else {
                    Some(NullBuffer::from(s.validity.clone()))
                };
                Arc::new(StructArray::try_new(s.fields.clone(), children, nulls)?)
            }
        })
    }

    fn type_name(&self) -> &'static str {
        match self {
            ColumnVector::Boolean(_) => "Boolean",
            ColumnVector::Int32(_) => "Int32",
            ColumnVector::Utf8(_) => "Utf8",
            ColumnVector::Decimal(_) => "Decimal",
            ColumnVector::Struct(_) => "Struct",
        }
    }
}

fn fit_decimal(value: DecimalValue, precision: u8, scale: i8) -> Result<i128> {
    let scaled = value.rescale(scale)?;
    if scaled.precision() > precision {
        return Err(Error::InvalidArgumentError(format!(
            "decimal {scaled} does not fit Decimal({precision}, {scale})"
        )));
    }
    Ok(scaled.raw_value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::Field;

    #[test]
    fn set_grows_with_nulls() {
        let mut col = ColumnVector::for_data_type(&DataType::Int32).unwrap();
        col.set(3, CellValue::Int32(7)).unwrap();
        assert_eq!(col, ColumnVector::Int32(vec![None, None, None, Some(7)]));
        col.set(1, CellValue::Int32(-2)).unwrap();
        assert_eq!(col.get(1).unwrap(), Some(CellValue::Int32(-2)));
        assert_eq!(col.get(0).unwrap(), None);
    }

    #[test]
    fn type_mismatch_is_unsupported() {
        let mut col = ColumnVector::for_data_type(&DataType::Boolean).unwrap();
        let err = col.set(0, CellValue::Utf8("x".into())).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)));
        assert!(ColumnVector::for_data_type(&DataType::Float64).is_err());
    }

    #[test]
    fn decimal_widens_ints_and_rounds() {
        let mut col = ColumnVector::for_data_type(&DataType::Decimal128(15, 3)).unwrap();
        col.set(0, CellValue::Int32(2)).unwrap();
        col.set(1, DecimalValue::new(1_23_45, 4).unwrap().into()).unwrap();
        let ColumnVector::Decimal(d) = &col else {
            panic!("expected decimal column");
        };
        assert_eq!(d.values, vec![Some(2_000), Some(1_235)]);

        let too_wide = DecimalValue::new(10i128.pow(14), 0).unwrap();
        assert!(col.set(2, too_wide.into()).is_err());
    }

    #[test]
    fn invalid_stored_decimal_is_an_error_not_a_null() {
        let col = ColumnVector::Decimal(DecimalColumn {
            precision: 10,
            scale: -2,
            values: vec![Some(5), None],
        });
        assert!(matches!(col.get(0), Err(Error::InvalidArgumentError(_))));
        assert_eq!(col.get(1).unwrap(), None);
        assert_eq!(col.get(9).unwrap(), None);
    }

    #[test]
    fn arrays_round_trip_through_vectors() {
        let fields = Fields::from(vec![
            Field::new("street", DataType::Utf8, true),
            Field::new("number", DataType::Int32, true),
        ]);
        let mut col = ColumnVector::for_data_type(&DataType::Struct(fields)).unwrap();
        col.child_mut("street")
            .unwrap()
            .set(0, "Halloway".into())
            .unwrap();
        col.child_mut("number").unwrap().set(1, 12.into()).unwrap();
        col.resize(3);
        col.set_null(2);

        let array = col.to_array().unwrap();
        assert_eq!(array.len(), 3);
        assert!(array.is_null(2));
        let back = ColumnVector::from_array(array.as_ref()).unwrap();
        assert_eq!(back, col);
    }
}
