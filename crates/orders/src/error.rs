//! Order errors

use kestrel_core::{
    ClientOrderId, OrderListId, OrderStatus, OrderType, ParseError, Quantity, TradeId,
    ValidationError,
};
use thiserror::Error;

/// Event rejected by the order state machine
///
/// These are data-integrity faults: the event stream disagrees with the
/// order's current state. The order is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("{client_order_id}: invalid transition {event} from {status}")]
    InvalidTransition {
        client_order_id: ClientOrderId,
        status: OrderStatus,
        event: &'static str,
    },

    #[error("{client_order_id}: {order_type} orders are not conditional")]
    NotConditional {
        client_order_id: ClientOrderId,
        order_type: OrderType,
    },

    #[error("{client_order_id}: already triggered")]
    AlreadyTriggered { client_order_id: ClientOrderId },

    #[error("{client_order_id}: {order_type} order filled before it was triggered")]
    NotTriggered {
        client_order_id: ClientOrderId,
        order_type: OrderType,
    },

    #[error("{client_order_id}: fill of {last_qty} exceeds leaves_qty {leaves_qty}")]
    Overfill {
        client_order_id: ClientOrderId,
        last_qty: Quantity,
        leaves_qty: Quantity,
    },

    #[error("{client_order_id}: duplicate trade_id {trade_id}")]
    DuplicateTradeId {
        client_order_id: ClientOrderId,
        trade_id: TradeId,
    },

    #[error("event for {event_client_order_id} applied to order {client_order_id}")]
    OrderMismatch {
        client_order_id: ClientOrderId,
        event_client_order_id: ClientOrderId,
    },

    #[error("invalid order list {order_list_id}: {reason}")]
    InvalidOrderList {
        order_list_id: OrderListId,
        reason: String,
    },
}

/// Order factory configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("currency mismatch: {lhs} vs {rhs}")]
    CurrencyMismatch { lhs: String, rhs: String },

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<kestrel_core::Error> for Error {
    fn from(error: kestrel_core::Error) -> Self {
        match error {
            kestrel_core::Error::Validation(e) => Error::Validation(e),
            kestrel_core::Error::Parse(e) => Error::Parse(e),
            kestrel_core::Error::CurrencyMismatch { lhs, rhs } => {
                Error::CurrencyMismatch { lhs, rhs }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
