use serde::{Deserialize, Serialize};

use crate::values::{Currency, UnixNanos};

/// Instrument class with its class-specific fields
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentKind {
    /// Spot pair (e.g., BTC/USD)
    CurrencyPair,
    /// Perpetual swap without expiry (e.g., BTC-PERP)
    CryptoPerpetual,
    /// Dated future on a crypto underlying
    CryptoFuture {
        underlying: Currency,
        activation_ns: UnixNanos,
        expiration_ns: UnixNanos,
    },
    /// Listed equity
    Equity { isin: Option<String> },
}

impl InstrumentKind {
    /// Check if this is a derivative (non-spot)
    pub fn is_derivative(&self) -> bool {
        matches!(
            self,
            InstrumentKind::CryptoPerpetual | InstrumentKind::CryptoFuture { .. }
        )
    }

    pub fn expiration_ns(&self) -> Option<UnixNanos> {
        match self {
            InstrumentKind::CryptoFuture { expiration_ns, .. } => Some(*expiration_ns),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InstrumentKind::CurrencyPair => "CurrencyPair",
            InstrumentKind::CryptoPerpetual => "CryptoPerpetual",
            InstrumentKind::CryptoFuture { .. } => "CryptoFuture",
            InstrumentKind::Equity { .. } => "Equity",
        }
    }
}
