//! Kestrel Orders
//!
//! The order aggregate and everything needed to build and drive it:
//! - **Variants**: MARKET, LIMIT, STOP_MARKET, STOP_LIMIT, MARKET_IF_TOUCHED
//!   and LIMIT_IF_TOUCHED as one [`Order`] type with an [`OrderKind`] payload
//! - **Events**: the append-only log every order is projected from
//! - **State machine**: legal status transitions per event
//! - **Order lists**: contingent groups such as brackets
//! - **Factory**: identifier generation and timestamping
//!
//! ## Lifecycle
//!
//! ```text
//! OrderInitialized ──► Order (INITIALIZED)
//!                        │ apply(OrderSubmitted)
//!                        ▼
//!                      SUBMITTED ──► REJECTED
//!                        │ apply(OrderAccepted)
//!                        ▼
//!                      ACCEPTED ◄──► PENDING_UPDATE / PENDING_CANCEL
//!                        │ apply(OrderFilled)
//!                        ▼
//!                      PARTIALLY_FILLED ──► FILLED
//!
//! CANCELED and EXPIRED are reachable from every live status.
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kestrel_orders::{OrderFactory, OrderFactoryConfig, LimitParams};
//!
//! let mut factory = OrderFactory::new(config, Box::new(SystemClock::new()), Box::new(RandomUuidFactory))?;
//! let mut order = factory.limit(instrument_id, OrderSide::Buy, qty, LimitParams::new(price))?;
//!
//! for event in venue_events {
//!     order.apply(event)?;
//! }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod factory;
pub mod fsm;
pub mod kind;
pub mod list;
pub mod order;

// Re-export main types
pub use config::OrderFactoryConfig;
pub use error::{ConfigError, Error, Result, StateError};
pub use events::{
    OrderAccepted, OrderCancelRejected, OrderCanceled, OrderDenied, OrderEvent, OrderEventHeader,
    OrderExpired, OrderFilled, OrderInitialized, OrderModifyRejected, OrderPendingCancel,
    OrderPendingUpdate, OrderRejected, OrderSubmitted, OrderTriggered, OrderUpdated,
};
pub use factory::OrderFactory;
pub use fsm::OrderStateMachine;
pub use kind::{LimitParams, OrderKind, TriggerParams};
pub use list::OrderList;
pub use order::{Order, OrderParams};
