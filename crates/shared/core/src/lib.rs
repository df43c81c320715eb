//! Kestrel Core Domain
//!
//! Pure value types for the Kestrel trading model: fixed-precision numerics,
//! identifiers, market data and instrument definitions.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod data;
pub mod enums;
pub mod error;
pub mod identifiers;
pub mod instruments;
pub mod values;

// Re-export commonly used types at crate root
pub use data::{Bar, BarSpecification, BarType, QuoteTick, TradeTick};
pub use enums::{
    AggregationSource, AggressorSide, BarAggregation, ContingencyType, CurrencyType,
    LiquiditySide, OrderSide, OrderStatus, OrderType, PriceType, TimeInForce, TriggerType,
};
pub use error::{Error, ParseError, Result, ValidationError, Violations};
pub use identifiers::{
    AccountId, ClientOrderId, InstrumentId, OrderListId, PositionId, StrategyId, Symbol, TradeId,
    TraderId, Venue, VenueOrderId,
};
pub use instruments::{Instrument, InstrumentBuilder, InstrumentKind};
pub use values::{Currency, FIXED_PRECISION, Money, Price, Quantity, UnixNanos};
