use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, Violations};
use crate::identifiers::InstrumentId;
use crate::values::{Price, Quantity, UnixNanos};

/// Top-of-book quote
///
/// Both sides must be strictly positive. `ask >= bid` is deliberately not
/// enforced: venues publish crossed quotes transiently and the model keeps
/// them as reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "QuoteFields")]
pub struct QuoteTick {
    instrument_id: InstrumentId,
    bid: Price,
    ask: Price,
    bid_size: Quantity,
    ask_size: Quantity,
    ts_event: UnixNanos,
    ts_init: UnixNanos,
}

#[derive(Deserialize)]
struct QuoteFields {
    instrument_id: InstrumentId,
    bid: Price,
    ask: Price,
    bid_size: Quantity,
    ask_size: Quantity,
    ts_event: UnixNanos,
    ts_init: UnixNanos,
}

impl TryFrom<QuoteFields> for QuoteTick {
    type Error = ValidationError;

    fn try_from(f: QuoteFields) -> Result<Self, Self::Error> {
        QuoteTick::new(
            f.instrument_id,
            f.bid,
            f.ask,
            f.bid_size,
            f.ask_size,
            f.ts_event,
            f.ts_init,
        )
    }
}

impl QuoteTick {
    pub fn new(
        instrument_id: InstrumentId,
        bid: Price,
        ask: Price,
        bid_size: Quantity,
        ask_size: Quantity,
        ts_event: UnixNanos,
        ts_init: UnixNanos,
    ) -> Result<Self, ValidationError> {
        let mut violations = Violations::new();
        violations.check(bid.is_positive(), || format!("bid {bid} must be positive"));
        violations.check(ask.is_positive(), || format!("ask {ask} must be positive"));
        violations.check(bid.precision() == ask.precision(), || {
            format!(
                "bid precision {} != ask precision {}",
                bid.precision(),
                ask.precision()
            )
        });
        violations.check(bid_size.precision() == ask_size.precision(), || {
            format!(
                "bid_size precision {} != ask_size precision {}",
                bid_size.precision(),
                ask_size.precision()
            )
        });
        violations.finish()?;

        Ok(Self {
            instrument_id,
            bid,
            ask,
            bid_size,
            ask_size,
            ts_event,
            ts_init,
        })
    }

    pub fn instrument_id(&self) -> &InstrumentId {
        &self.instrument_id
    }

    pub fn bid(&self) -> Price {
        self.bid
    }

    pub fn ask(&self) -> Price {
        self.ask
    }

    pub fn bid_size(&self) -> Quantity {
        self.bid_size
    }

    pub fn ask_size(&self) -> Quantity {
        self.ask_size
    }

    pub fn ts_event(&self) -> UnixNanos {
        self.ts_event
    }

    pub fn ts_init(&self) -> UnixNanos {
        self.ts_init
    }

    /// True when the bid is above the ask
    pub fn is_crossed(&self) -> bool {
        self.bid.as_decimal() > self.ask.as_decimal()
    }
}

impl fmt::Display for QuoteTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.instrument_id, self.bid, self.ask, self.bid_size, self.ask_size, self.ts_event
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(bid: &str, ask: &str) -> Result<QuoteTick, ValidationError> {
        QuoteTick::new(
            "AUD/USD.SIM".parse().unwrap(),
            bid.parse().unwrap(),
            ask.parse().unwrap(),
            "1".parse().unwrap(),
            "1".parse().unwrap(),
            1,
            2,
        )
    }

    #[test]
    fn test_valid_quote() {
        let tick = quote("1.00000", "1.00001").unwrap();
        assert_eq!(tick.to_string(), "AUD/USD.SIM,1.00000,1.00001,1,1,1");
        assert!(!tick.is_crossed());
    }

    #[test]
    fn test_crossed_quote_permitted() {
        let tick = quote("1.00002", "1.00001").unwrap();
        assert!(tick.is_crossed());
    }

    #[test]
    fn test_zero_prices_rejected() {
        let err = quote("0.00000", "0.00000").unwrap_err();
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_precision_mismatch_rejected() {
        let err = quote("1.0", "1.00001").unwrap_err();
        assert!(err.mentions("precision"));
    }
}
