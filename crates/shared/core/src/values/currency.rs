use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::check_precision;
use crate::enums::CurrencyType;
use crate::error::{Error, ParseError, ValidationError};

/// A medium of exchange with a fixed minor-unit precision
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    code: String,
    precision: u8,
    currency_type: CurrencyType,
}

impl Currency {
    /// Create a currency; the code must be 1-10 uppercase ASCII alphanumerics
    pub fn new(
        code: impl Into<String>,
        precision: u8,
        currency_type: CurrencyType,
    ) -> Result<Self, ValidationError> {
        let code = code.into();
        if code.is_empty() || code.len() > 10 {
            return Err(ValidationError::new(format!(
                "Currency code '{code}' must be 1-10 characters"
            )));
        }
        if !code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::new(format!(
                "Currency code '{code}' must be uppercase alphanumeric"
            )));
        }
        check_precision("Currency", precision)?;
        Ok(Self {
            code,
            precision,
            currency_type,
        })
    }

    fn builtin(code: &str, precision: u8, currency_type: CurrencyType) -> Self {
        Self {
            code: code.to_string(),
            precision,
            currency_type,
        }
    }

    pub fn usd() -> Self {
        Self::builtin("USD", 2, CurrencyType::Fiat)
    }

    pub fn eur() -> Self {
        Self::builtin("EUR", 2, CurrencyType::Fiat)
    }

    pub fn gbp() -> Self {
        Self::builtin("GBP", 2, CurrencyType::Fiat)
    }

    pub fn jpy() -> Self {
        Self::builtin("JPY", 0, CurrencyType::Fiat)
    }

    pub fn usdt() -> Self {
        Self::builtin("USDT", 8, CurrencyType::Crypto)
    }

    pub fn btc() -> Self {
        Self::builtin("BTC", 8, CurrencyType::Crypto)
    }

    pub fn eth() -> Self {
        Self::builtin("ETH", 8, CurrencyType::Crypto)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn currency_type(&self) -> CurrencyType {
        self.currency_type
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

impl FromStr for Currency {
    type Err = Error;

    /// Resolve one of the built-in currencies by code
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Self::usd()),
            "EUR" => Ok(Self::eur()),
            "GBP" => Ok(Self::gbp()),
            "JPY" => Ok(Self::jpy()),
            "USDT" => Ok(Self::usdt()),
            "BTC" => Ok(Self::btc()),
            "ETH" => Ok(Self::eth()),
            _ => Err(ParseError::new("Currency", s, "code", s).into()),
        }
    }
}
