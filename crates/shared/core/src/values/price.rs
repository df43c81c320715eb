//! Fixed-precision price
//!
//! A price is a non-negative decimal pinned to a declared precision.
//! Example: `Price::new(123.456, 2)` stores `123.46` and renders as `"123.46"`.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{canonical_precision, decimal_from_f64, non_negative};
use crate::error::{Error, ParseError, ValidationError};

/// Non-negative price with explicit precision
///
/// Equality, hashing and ordering use the `(value, precision)` pair, so
/// `1.0` and `1.00` are distinct prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    value: Decimal,
    precision: u8,
}

impl Price {
    /// Create from f64, rounding half-even to `precision`
    pub fn new(value: f64, precision: u8) -> Result<Self, ValidationError> {
        let value = decimal_from_f64("Price", value, precision)?;
        Self::from_decimal(value, precision)
    }

    /// Create from a decimal, rounding half-even to `precision`
    pub fn from_decimal(value: Decimal, precision: u8) -> Result<Self, ValidationError> {
        let value = non_negative("Price", value, precision)?;
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

    /// Convert to f64 (for compatibility with external systems)
    pub fn as_f64(&self) -> f64 {
        self.value.to_f64().unwrap_or(f64::NAN)
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.value > Decimal::ZERO
    }

    /// True when this price is a whole number of `increment` steps
    pub fn is_multiple_of(&self, increment: &Price) -> bool {
        increment.is_zero()
            || self.value.checked_rem(increment.value).is_some_and(|r| r.is_zero())
    }

    /// Subtract, failing if the result would be negative
    pub fn checked_sub(self, rhs: Price) -> Result<Price, ValidationError> {
        let precision = self.precision.max(rhs.precision);
        Price::from_decimal(self.value - rhs.value, precision)
    }
}

impl Add for Price {
    type Output = Price;

    /// Exact sum at the higher of the two precisions
    fn add(self, rhs: Self) -> Self::Output {
        Price {
            value: super::fix_scale(self.value + rhs.value, self.precision.max(rhs.precision)),
            precision: self.precision.max(rhs.precision),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", usize::from(self.precision), self.value)
    }
}

impl FromStr for Price {
    type Err = Error;

    /// Parse the canonical form; precision is the number of fractional digits
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value =
            Decimal::from_str_exact(s).map_err(|_| ParseError::new("Price", s, "value", s))?;
        let precision = u8::try_from(canonical_precision(s))
            .map_err(|_| ParseError::new("Price", s, "precision", s))?;
        Ok(Price::from_decimal(value, precision)?)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_rounds_to_precision() {
        let p = Price::new(123.456, 2).unwrap();
        assert_eq!(p.as_decimal(), dec!(123.46));
        assert_eq!(p.precision(), 2);
    }

    #[test]
    fn test_display_pads_to_precision() {
        assert_eq!(Price::new(100.0, 2).unwrap().to_string(), "100.00");
        assert_eq!(Price::new(1.5, 0).unwrap().to_string(), "2");
        assert_eq!(Price::new(0.1, 5).unwrap().to_string(), "0.10000");
    }

    #[test]
    fn test_parse() {
        let p: Price = "123.4500".parse().unwrap();
        assert_eq!(p.precision(), 4);
        assert_eq!(p.as_decimal(), dec!(123.45));

        let p: Price = "1".parse().unwrap();
        assert_eq!(p.precision(), 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("abc".parse::<Price>().is_err());
        assert!("1.2.3".parse::<Price>().is_err());
        assert!("-1.00".parse::<Price>().is_err());
        assert!("1.0000000000".parse::<Price>().is_err());
    }

    #[test]
    fn test_negative_rejected() {
        let err = Price::new(-0.01, 2).unwrap_err();
        assert!(err.mentions("non-negative"));
    }

    #[test]
    fn test_precision_is_part_of_equality() {
        let a = Price::new(1.0, 1).unwrap();
        let b = Price::new(1.0, 2).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.as_decimal(), b.as_decimal());
    }

    #[test]
    fn test_add_promotes_precision() {
        let a = Price::new(1.5, 1).unwrap();
        let b = Price::new(0.25, 2).unwrap();
        let sum = a + b;
        assert_eq!(sum.precision(), 2);
        assert_eq!(sum.to_string(), "1.75");
    }

    #[test]
    fn test_checked_sub() {
        let a = Price::new(1.00, 2).unwrap();
        let b = Price::new(0.25, 2).unwrap();
        assert_eq!(a.checked_sub(b).unwrap().to_string(), "0.75");
        assert!(b.checked_sub(a).is_err());
    }

    #[test]
    fn test_ordering_by_value() {
        let a = Price::new(99.5, 2).unwrap();
        let b = Price::new(100.0, 2).unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_multiple_of_increment() {
        let tick = Price::new(0.05, 2).unwrap();
        assert!(Price::new(1.15, 2).unwrap().is_multiple_of(&tick));
        assert!(!Price::new(1.12, 2).unwrap().is_multiple_of(&tick));
    }

    #[test]
    fn test_serde_as_string() {
        let p = Price::new(42.1, 3).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"42.100\"");
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
