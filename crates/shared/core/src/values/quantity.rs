//! Fixed-precision quantity
//!
//! Quantities may be zero (an order's filled quantity starts at zero) but
//! never negative.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{canonical_precision, decimal_from_f64, fix_scale, non_negative};
use crate::error::{Error, ParseError, ValidationError};

/// Non-negative quantity with explicit precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity {
    value: Decimal,
    precision: u8,
}

impl Quantity {
    /// Create from f64, rounding half-even to `precision`
    pub fn new(value: f64, precision: u8) -> Result<Self, ValidationError> {
        let value = decimal_from_f64("Quantity", value, precision)?;
        Self::from_decimal(value, precision)
    }

    /// Create from a decimal, rounding half-even to `precision`
    pub fn from_decimal(value: Decimal, precision: u8) -> Result<Self, ValidationError> {
        let value = non_negative("Quantity", value, precision)?;
        Ok(Self { value, precision })
    }

    pub fn zero(precision: u8) -> Result<Self, ValidationError> {
        Self::from_decimal(Decimal::ZERO, precision)
    }

    #[inline]
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    #[inline]
    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn as_f64(&self) -> f64 {
        self.value.to_f64().unwrap_or(f64::NAN)
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.value > Decimal::ZERO
    }

    /// True when this quantity is a whole number of `increment` steps
    pub fn is_multiple_of(&self, increment: &Quantity) -> bool {
        increment.is_zero()
            || self.value.checked_rem(increment.value).is_some_and(|r| r.is_zero())
    }

    /// Subtract, failing if the result would be negative
    pub fn checked_sub(self, rhs: Quantity) -> Result<Quantity, ValidationError> {
        let precision = self.precision.max(rhs.precision);
        Quantity::from_decimal(self.value - rhs.value, precision)
    }

    /// Same value re-expressed at another precision (half-even rounding)
    pub fn with_precision(self, precision: u8) -> Result<Quantity, ValidationError> {
        Quantity::from_decimal(self.value, precision)
    }
}

impl Add for Quantity {
    type Output = Quantity;

    /// Exact sum at the higher of the two precisions
    fn add(self, rhs: Self) -> Self::Output {
        let precision = self.precision.max(rhs.precision);
        Quantity {
            value: fix_scale(self.value + rhs.value, precision),
            precision,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", usize::from(self.precision), self.value)
    }
}

impl FromStr for Quantity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value =
            Decimal::from_str_exact(s).map_err(|_| ParseError::new("Quantity", s, "value", s))?;
        let precision = u8::try_from(canonical_precision(s))
            .map_err(|_| ParseError::new("Quantity", s, "precision", s))?;
        Ok(Quantity::from_decimal(value, precision)?)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
