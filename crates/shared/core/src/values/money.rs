use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Currency, decimal_from_f64, fix_scale};
use crate::error::{Error, ParseError, ValidationError};

/// An amount denominated in a currency
///
/// The amount is held at the currency's precision and may be negative.
/// Arithmetic between different currencies is an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    pub fn new(amount: f64, currency: Currency) -> Result<Self, ValidationError> {
        let amount = decimal_from_f64("Money", amount, currency.precision())?;
        Ok(Self { amount, currency })
    }

    pub fn from_decimal(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: fix_scale(amount, currency.precision()),
            currency,
        }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::from_decimal(Decimal::ZERO, currency)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.amount
    }

    pub fn as_f64(&self) -> f64 {
        self.amount.to_f64().unwrap_or(f64::NAN)
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative()
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), Error> {
        if self.currency != other.currency {
            return Err(Error::CurrencyMismatch {
                lhs: self.currency.code().to_string(),
                rhs: other.currency.code().to_string(),
            });
        }
        Ok(())
    }

    pub fn checked_add(&self, other: &Money) -> Result<Money, Error> {
        self.ensure_same_currency(other)?;
        Ok(Money::from_decimal(
            self.amount + other.amount,
            self.currency.clone(),
        ))
    }

    pub fn checked_sub(&self, other: &Money) -> Result<Money, Error> {
        self.ensure_same_currency(other)?;
        Ok(Money::from_decimal(
            self.amount - other.amount,
            self.currency.clone(),
        ))
    }

    /// Compare amounts, failing if the currencies differ
    pub fn checked_cmp(&self, other: &Money) -> Result<std::cmp::Ordering, Error> {
        self.ensure_same_currency(other)?;
        Ok(self.amount.cmp(&other.amount))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.*} {}",
            usize::from(self.currency.precision()),
            self.amount,
            self.currency
        )
    }
}

impl FromStr for Money {
    type Err = Error;

    /// Parse `"<amount> <CODE>"` for a built-in currency
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (amount, code) = s
            .trim()
            .split_once(' ')
            .ok_or_else(|| ParseError::new("Money", s, "format", s))?;
        let currency: Currency = code.parse()?;
        let amount = Decimal::from_str_exact(amount)
            .map_err(|_| ParseError::new("Money", s, "amount", amount))?;
        Ok(Money::from_decimal(amount, currency))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
