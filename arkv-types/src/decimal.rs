//! Fixed-point decimal cells using Arrow's `Decimal128` semantics.

use std::cmp::Ordering;
use std::fmt;

use arkv_result::{Error, Result};
use arrow::datatypes::DECIMAL128_MAX_PRECISION;

/// Runtime representation of a Decimal128 value: `value * 10^-scale`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecimalValue {
    value: i128,
    scale: i8,
}

impl DecimalValue {
    /// Create a decimal from its raw parts, validating precision bounds.
    pub fn new(value: i128, scale: i8) -> Result<Self> {
        if !(0..=DECIMAL128_MAX_PRECISION as i8).contains(&scale) {
            return Err(Error::InvalidArgumentError(format!(
                "decimal scale {scale} outside supported range"
            )));
        }
        if digit_count(value) > DECIMAL128_MAX_PRECISION {
            return Err(Error::InvalidArgumentError(format!(
                "decimal value {value} with scale {scale} exceeds maximum precision"
            )));
        }
        Ok(Self { value, scale })
    }

    /// Return the scaled integer backing this decimal.
    #[inline]
    pub fn raw_value(self) -> i128 {
        self.value
    }

    /// Return the scale (number of fractional digits).
    #[inline]
    pub fn scale(self) -> i8 {
        self.scale
    }

    /// Return the decimal precision (total digit count).
    #[inline]
    pub fn precision(self) -> u8 {
        digit_count(self.value)
    }

    /// Re-express at `scale`, rounding half away from zero when digits are
    /// dropped.
    pub fn rescale(self, scale: i8) -> Result<Self> {
        match scale.cmp(&self.scale) {
            Ordering::Equal => Ok(self),
            Ordering::Greater => {
                let factor = pow10((scale - self.scale) as u32)?;
                let value = self
                    .value
                    .checked_mul(factor)
                    .ok_or_else(|| Error::InvalidArgumentError("decimal rescale overflow".into()))?;
                Self::new(value, scale)
            }
            Ordering::Less => {
                let factor = pow10((self.scale - scale) as u32)?;
                let quotient = self.value / factor;
                let remainder = (self.value % factor).abs();
                let rounded = if remainder >= factor - remainder {
                    quotient + self.value.signum()
                } else {
                    quotient
                };
                Self::new(rounded, scale)
            }
        }
    }

    /// Convert the decimal into an `f64` (lossy for high precision inputs).
    pub fn to_f64(self) -> f64 {
        if self.value == 0 {
            return 0.0;
        }
        (self.value as f64) / 10_f64.powi(self.scale as i32)
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.value);
        }
        let digits = self.value.unsigned_abs().to_string();
        let scale = self.scale as usize;
        if self.value < 0 {
            f.write_str("-")?;
        }
        if digits.len() <= scale {
            f.write_str("0.")?;
            for _ in digits.len()..scale {
                f.write_str("0")?;
            }
            return f.write_str(&digits);
        }
        let split = digits.len() - scale;
        f.write_str(&digits[..split])?;
        f.write_str(".")?;
        f.write_str(&digits[split..])
    }
}

fn pow10(exp: u32) -> Result<i128> {
    10i128
        .checked_pow(exp)
        .ok_or_else(|| Error::InvalidArgumentError(format!("10^{exp} overflows Decimal128")))
}

fn digit_count(value: i128) -> u8 {
    let mut magnitude = value.unsigned_abs();
    let mut count = 1u8;
    while magnitude >= 10 {
        magnitude /= 10;
        count += 1;
    }
    count
}
