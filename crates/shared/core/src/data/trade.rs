use std::fmt;

use serde::{Deserialize, Serialize};

use crate::enums::AggressorSide;
use crate::error::{ValidationError, Violations};
use crate::identifiers::{InstrumentId, TradeId};
use crate::values::{Price, Quantity, UnixNanos};

/// A single trade printed by a venue
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TradeFields")]
pub struct TradeTick {
    instrument_id: InstrumentId,
    price: Price,
    size: Quantity,
    aggressor_side: AggressorSide,
    trade_id: TradeId,
    ts_event: UnixNanos,
    ts_init: UnixNanos,
}

#[derive(Deserialize)]
struct TradeFields {
    instrument_id: InstrumentId,
    price: Price,
    size: Quantity,
    aggressor_side: AggressorSide,
    trade_id: TradeId,
    ts_event: UnixNanos,
    ts_init: UnixNanos,
}

impl TryFrom<TradeFields> for TradeTick {
    type Error = ValidationError;

    fn try_from(f: TradeFields) -> Result<Self, Self::Error> {
        TradeTick::new(
            f.instrument_id,
            f.price,
            f.size,
            f.aggressor_side,
            f.trade_id,
            f.ts_event,
            f.ts_init,
        )
    }
}

impl TradeTick {
    pub fn new(
        instrument_id: InstrumentId,
        price: Price,
        size: Quantity,
        aggressor_side: AggressorSide,
        trade_id: TradeId,
        ts_event: UnixNanos,
        ts_init: UnixNanos,
    ) -> Result<Self, ValidationError> {
        let mut violations = Violations::new();
        violations.check(price.is_positive(), || format!("price {price} must be positive"));
        violations.check(size.is_positive(), || format!("size {size} must be positive"));
        violations.finish()?;

        Ok(Self {
            instrument_id,
            price,
            size,
            aggressor_side,
            trade_id,
            ts_event,
            ts_init,
        })
    }

    pub fn instrument_id(&self) -> &InstrumentId {
        &self.instrument_id
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn size(&self) -> Quantity {
        self.size
    }

    pub fn aggressor_side(&self) -> AggressorSide {
        self.aggressor_side
    }

    pub fn trade_id(&self) -> &TradeId {
        &self.trade_id
    }

    pub fn ts_event(&self) -> UnixNanos {
        self.ts_event
    }

    pub fn ts_init(&self) -> UnixNanos {
        self.ts_init
    }
}

impl fmt::Display for TradeTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.instrument_id,
            self.price,
            self.size,
            self.aggressor_side,
            self.trade_id,
            self.ts_event
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_tick() {
        let tick = TradeTick::new(
            "ETHUSDT.BINANCE".parse().unwrap(),
            "10000.00".parse().unwrap(),
            "1.00000".parse().unwrap(),
            AggressorSide::Buyer,
            TradeId::new("123456789").unwrap(),
            1,
            1,
        )
        .unwrap();
        assert_eq!(
            tick.to_string(),
            "ETHUSDT.BINANCE,10000.00,1.00000,BUYER,123456789,1"
        );
    }

    #[test]
    fn test_zero_size_rejected() {
        let err = TradeTick::new(
            "ETHUSDT.BINANCE".parse().unwrap(),
            "10000.00".parse().unwrap(),
            "0".parse().unwrap(),
            AggressorSide::NoAggressor,
            TradeId::new("1").unwrap(),
            1,
            1,
        )
        .unwrap_err();
        assert!(err.mentions("size"));
    }
}
