//! Market data value objects
//!
//! Construction is the single validation gate: every field is private and a
//! value only exists once its invariants have been checked.

mod bar;
mod quote;
mod trade;

pub use bar::{Bar, BarSpecification, BarType};
pub use quote::QuoteTick;
pub use trade::TradeTick;
