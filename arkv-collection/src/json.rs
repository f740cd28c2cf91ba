//! JSON value to cell mapping.
//!
//! | JSON                       | cell / new column            |
//! |----------------------------|------------------------------|
//! | `true` / `false`           | Boolean                      |
//! | integer within `i32`       | Int32                        |
//! | number with a fraction     | Decimal(precision, scale)    |
//! | string                     | Utf8                         |
//! | `null`                     | no cell (left null)          |
//!
//! Integers outside `i32`, objects and arrays are `UnsupportedType`.

use std::str::FromStr;

use arkv_result::{Error, Result};
use arkv_types::{CellValue, DecimalValue};
use arrow::datatypes::{DataType, Field};
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};

use crate::config::IngestOptions;

/// Cell for `value`; `None` for JSON `null`.
pub fn json_to_cell(value: &Value) -> Result<Option<CellValue>> {
    Ok(Some(match value {
        Value::Null => return Ok(None),
        Value::Bool(b) => CellValue::Boolean(*b),
        Value::String(s) => CellValue::Utf8(s.clone()),
        Value::Number(n) => number_to_cell(n)?,
        Value::Array(_) => return Err(Error::unsupported("JSON arrays cannot be stored")),
        Value::Object(_) => return Err(Error::unsupported("nested JSON objects cannot be stored")),
    }))
}

fn number_to_cell(number: &Number) -> Result<CellValue> {
    if let Some(whole) = number.as_i64() {
        return i32::try_from(whole)
            .map(CellValue::Int32)
            .map_err(|_| Error::UnsupportedType(format!("integer {whole} does not fit Int32")));
    }
    if number.is_u64() {
        return Err(Error::UnsupportedType(format!(
            "integer {number} does not fit Int32"
        )));
    }
    let text = number.to_string();
    let decimal = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|err| Error::UnsupportedType(format!("number {text} is not a decimal: {err}")))?;
    let scale = i8::try_from(decimal.scale()).map_err(|_| Error::unsupported("decimal scale"))?;
    Ok(CellValue::Decimal(DecimalValue::new(decimal.mantissa(), scale)?))
}

/// Column definition for a field first seen holding `cell`.
pub fn field_for(name: &str, cell: &CellValue, options: &IngestOptions) -> Field {
    let data_type = match cell {
        CellValue::Boolean(_) => DataType::Boolean,
        CellValue::Int32(_) => DataType::Int32,
        CellValue::Utf8(_) => DataType::Utf8,
        CellValue::Decimal(_) => {
            DataType::Decimal128(options.decimal_precision, options.decimal_scale)
        }
    };
    Field::new(name, data_type, true)
}

/// Parse a JSON array of objects. A single object is accepted as one row.
pub fn parse_rows(json: &str) -> Result<Vec<Map<String, Value>>> {
    match serde_json::from_str::<Value>(json)? {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(row) => Ok(row),
                other => Err(Error::InvalidArgumentError(format!(
                    "row {i} is not a JSON object: {other}"
                ))),
            })
            .collect(),
        Value::Object(row) => Ok(vec![row]),
        other => Err(Error::InvalidArgumentError(format!(
            "expected a JSON array of objects, found {other}"
        ))),
    }
}
