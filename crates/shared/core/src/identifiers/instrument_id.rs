use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::check_identifier;
use crate::error::{Error, ParseError, ValidationError};

/// Ticker code of an instrument at its venue (e.g. "BTCUSD", "BRK.B")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        check_identifier("Symbol", &code)?;
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::new(value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trading venue name
///
/// Names are normalized to uppercase on construction, so `"ftx"` and `"FTX"`
/// identify the same venue. A venue name cannot contain `.`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Venue(String);

impl Venue {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        check_identifier("Venue", &name)?;
        if name.contains('.') {
            return Err(ValidationError::new(format!(
                "Venue '{name}' cannot contain '.'"
            )));
        }
        Ok(Self(name.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Venue {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Venue::new(value)
    }
}

impl From<Venue> for String {
    fn from(venue: Venue) -> Self {
        venue.0
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Instrument identity, canonical form `"<SYMBOL>.<VENUE>"`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrumentId {
    pub symbol: Symbol,
    pub venue: Venue,
}

impl InstrumentId {
    pub fn new(symbol: Symbol, venue: Venue) -> Self {
        Self { symbol, venue }
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.symbol, self.venue)
    }
}

impl FromStr for InstrumentId {
    type Err = Error;

    /// Splits on the last `.`, so symbols may themselves contain dots
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (symbol, venue) = s
            .rsplit_once('.')
            .ok_or_else(|| ParseError::new("InstrumentId", s, "separator", s))?;
        let symbol =
            Symbol::new(symbol).map_err(|_| ParseError::new("InstrumentId", s, "symbol", symbol))?;
        let venue =
            Venue::new(venue).map_err(|_| ParseError::new("InstrumentId", s, "venue", venue))?;
        Ok(Self { symbol, venue })
    }
}

impl Serialize for InstrumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InstrumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
