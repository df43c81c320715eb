//! Identifiers
//!
//! Immutable, validated string newtypes. All are hashable and safe to use as
//! map keys.

mod instrument_id;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, ValidationError};

pub use instrument_id::{InstrumentId, Symbol, Venue};

pub(crate) fn check_identifier(kind: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(format!("{kind} cannot be empty")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ValidationError::new(format!(
            "{kind} '{value}' cannot contain whitespace"
        )));
    }
    Ok(())
}

fn check_tagged(kind: &str, value: &str) -> Result<(), ValidationError> {
    match value.rsplit_once('-') {
        Some((name, tag)) if !name.is_empty() && !tag.is_empty() => Ok(()),
        _ => Err(ValidationError::new(format!(
            "{kind} '{value}' must be of the form NAME-TAG"
        ))),
    }
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident $(, $check:expr)?) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let value = value.into();
                check_identifier(stringify!($name), &value)?;
                $(($check)(stringify!($name), &value)?;)?
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::new(s)?)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValidationError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::new(s).map_err(serde::de::Error::custom)
            }
        }
    };
}

identifier!(
    /// Trader identity, e.g. `TRADER-001`
    TraderId,
    check_tagged
);
identifier!(
    /// Strategy identity, e.g. `EMACross-001`
    StrategyId,
    check_tagged
);
identifier!(
    /// Account at a venue, formatted `ISSUER-NUMBER`
    AccountId,
    check_tagged
);
identifier!(
    /// Order identity assigned by the trading client
    ClientOrderId
);
identifier!(
    /// Order identity assigned by the venue
    VenueOrderId
);
identifier!(PositionId);
identifier!(OrderListId);
identifier!(
    /// Venue-assigned trade identity, unique per fill
    TradeId
);

impl TraderId {
    /// Part after the last `-`, used in generated order IDs
    pub fn tag(&self) -> &str {
        self.0.rsplit_once('-').map_or(&self.0, |(_, tag)| tag)
    }
}

impl StrategyId {
    pub fn tag(&self) -> &str {
        self.0.rsplit_once('-').map_or(&self.0, |(_, tag)| tag)
    }
}

impl AccountId {
    pub fn issuer(&self) -> &str {
        self.0.rsplit_once('-').map_or(&self.0, |(issuer, _)| issuer)
    }
}
