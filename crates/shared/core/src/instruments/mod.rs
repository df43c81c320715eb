//! Instrument definitions for tradeable assets
//!
//! One [`Instrument`] struct carries the shared specification (precisions,
//! increments, limits, fees); [`InstrumentKind`] carries what differs between
//! spot pairs, perpetuals, dated futures and equities.

mod builder;
mod instrument;
mod kind;

pub use builder::InstrumentBuilder;
pub use instrument::Instrument;
pub use kind::InstrumentKind;
