use std::fmt;

use arkv_result::{Error, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Decimal128Type, Int32Type};

use crate::decimal::DecimalValue;

/// One non-null cell of a supported leaf type.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Boolean(bool),
    Int32(i32),
    Utf8(String),
    Decimal(DecimalValue),
}

impl CellValue {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Boolean(_) => "Boolean",
            CellValue::Int32(_) => "Int32",
            CellValue::Utf8(_) => "Utf8",
            CellValue::Decimal(_) => "Decimal",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Boolean(v) => write!(f, "{v}"),
            CellValue::Int32(v) => write!(f, "{v}"),
            CellValue::Utf8(v) => f.write_str(v),
            CellValue::Decimal(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Boolean(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Int32(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Utf8(v.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Utf8(v)
    }
}

impl From<DecimalValue> for CellValue {
    fn from(v: DecimalValue) -> Self {
        CellValue::Decimal(v)
    }
}

/// Read row `row` of a leaf column. `Ok(None)` for a null cell.
pub fn cell_at(array: &dyn Array, row: usize) -> Result<Option<CellValue>> {
    if row >= array.len() {
        return Err(Error::InvalidArgumentError(format!(
            "row {row} out of bounds for column of length {}",
            array.len()
        )));
    }
    if array.is_null(row) {
        return Ok(None);
    }
    let cell = match array.data_type() {
        DataType::Boolean => CellValue::Boolean(array.as_boolean().value(row)),
        DataType::Int32 => CellValue::Int32(array.as_primitive::<Int32Type>().value(row)),
        DataType::Utf8 => CellValue::Utf8(array.as_string::<i32>().value(row).to_owned()),
        DataType::Decimal128(_, scale) => CellValue::Decimal(DecimalValue::new(
            array.as_primitive::<Decimal128Type>().value(row),
            *scale,
        )?),
        other => {
            return Err(Error::UnsupportedType(format!(
                "cannot read a {other} cell"
            )));
        }
    };
    Ok(Some(cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{BooleanArray, Decimal128Array, Int64Array, StringArray};

    #[test]
    fn reads_each_supported_leaf() {
        let b = BooleanArray::from(vec![Some(true), None]);
        assert_eq!(cell_at(&b, 0).unwrap(), Some(CellValue::Boolean(true)));
        assert_eq!(cell_at(&b, 1).unwrap(), None);

        let s = StringArray::from(vec!["bar"]);
        assert_eq!(cell_at(&s, 0).unwrap(), Some("bar".into()));

        let d = Decimal128Array::from(vec![123_120i128])
            .with_precision_and_scale(15, 3)
            .unwrap();
        let cell = cell_at(&d, 0).unwrap().unwrap();
        assert_eq!(cell.to_string(), "123.120");
    }

    #[test]
    fn rejects_other_types_and_bad_rows() {
        let wide = Int64Array::from(vec![1i64]);
        assert!(matches!(cell_at(&wide, 0), Err(Error::UnsupportedType(_))));

        let s = StringArray::from(vec!["x"]);
        assert!(matches!(
            cell_at(&s, 3),
            Err(Error::InvalidArgumentError(_))
        ));
    }
}
