//! Enumerations shared across the model
//!
//! Every enum has a canonical SCREAMING_SNAKE_CASE string form used by
//! `Display`, `FromStr` and serde.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ParseError::new(stringify!($name), s, "variant", s)),
                }
            }
        }
    };
}

string_enum! {
    /// Order side (Buy or Sell)
    pub enum OrderSide {
        Buy => "BUY",
        Sell => "SELL",
    }
}

impl OrderSide {
    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

string_enum! {
    pub enum OrderType {
        /// Execute at current market price
        Market => "MARKET",
        /// Execute at specified price or better
        Limit => "LIMIT",
        /// Market order released when the trigger price is reached
        StopMarket => "STOP_MARKET",
        /// Limit order released when the trigger price is reached
        StopLimit => "STOP_LIMIT",
        /// Market order released when the market touches the trigger price
        MarketIfTouched => "MARKET_IF_TOUCHED",
        /// Limit order released when the market touches the trigger price
        LimitIfTouched => "LIMIT_IF_TOUCHED",
    }
}

impl OrderType {
    /// Conditional orders rest until triggered
    pub fn is_conditional(&self) -> bool {
        matches!(
            self,
            OrderType::StopMarket
                | OrderType::StopLimit
                | OrderType::MarketIfTouched
                | OrderType::LimitIfTouched
        )
    }

    pub fn has_limit_price(&self) -> bool {
        matches!(
            self,
            OrderType::Limit | OrderType::StopLimit | OrderType::LimitIfTouched
        )
    }
}

string_enum! {
    /// Order lifecycle status
    pub enum OrderStatus {
        Initialized => "INITIALIZED",
        Denied => "DENIED",
        Submitted => "SUBMITTED",
        Accepted => "ACCEPTED",
        Rejected => "REJECTED",
        Canceled => "CANCELED",
        Expired => "EXPIRED",
        PendingUpdate => "PENDING_UPDATE",
        PendingCancel => "PENDING_CANCEL",
        PartiallyFilled => "PARTIALLY_FILLED",
        Filled => "FILLED",
    }
}

impl OrderStatus {
    /// Returns true if no further event can be applied
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Denied
                | OrderStatus::Rejected
                | OrderStatus::Canceled
                | OrderStatus::Expired
                | OrderStatus::Filled
        )
    }

    /// Sent to the venue but not yet confirmed
    pub fn is_inflight(&self) -> bool {
        matches!(
            self,
            OrderStatus::Submitted | OrderStatus::PendingUpdate | OrderStatus::PendingCancel
        )
    }

    /// Awaiting the venue's answer to a modify or cancel request
    pub fn is_pending(&self) -> bool {
        matches!(self, OrderStatus::PendingUpdate | OrderStatus::PendingCancel)
    }

    /// Working at the venue
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            OrderStatus::Accepted
                | OrderStatus::PartiallyFilled
                | OrderStatus::PendingUpdate
                | OrderStatus::PendingCancel
        )
    }
}

string_enum! {
    /// Time-in-force instructions for order validity
    pub enum TimeInForce {
        /// Good Till Canceled
        Gtc => "GTC",
        /// Immediate or Cancel
        Ioc => "IOC",
        /// Fill or Kill
        Fok => "FOK",
        /// Good Till Date: requires an expire time
        Gtd => "GTD",
        /// Canceled at the end of the trading day
        Day => "DAY",
        AtTheOpen => "AT_THE_OPEN",
        AtTheClose => "AT_THE_CLOSE",
    }
}

string_enum! {
    /// Reference price a conditional order watches
    pub enum TriggerType {
        /// Unset sentinel, invalid for conditional orders
        NoTrigger => "NO_TRIGGER",
        Default => "DEFAULT",
        BidAsk => "BID_ASK",
        LastPrice => "LAST_PRICE",
        DoubleLast => "DOUBLE_LAST",
        DoubleBidAsk => "DOUBLE_BID_ASK",
        LastOrBidAsk => "LAST_OR_BID_ASK",
        MidPoint => "MID_POINT",
        MarkPrice => "MARK_PRICE",
        IndexPrice => "INDEX_PRICE",
    }
}

string_enum! {
    /// How orders in a list are coupled
    pub enum ContingencyType {
        NoContingency => "NO_CONTINGENCY",
        /// One-Cancels-Other
        Oco => "OCO",
        /// One-Triggers-Other
        Oto => "OTO",
        /// One-Updates-Other
        Ouo => "OUO",
    }
}

string_enum! {
    pub enum LiquiditySide {
        NoLiquiditySide => "NO_LIQUIDITY_SIDE",
        Maker => "MAKER",
        Taker => "TAKER",
    }
}

string_enum! {
    /// Side of the aggressing order for a trade
    pub enum AggressorSide {
        NoAggressor => "NO_AGGRESSOR",
        Buyer => "BUYER",
        Seller => "SELLER",
    }
}

string_enum! {
    /// Method used to aggregate bars
    pub enum BarAggregation {
        Tick => "TICK",
        TickImbalance => "TICK_IMBALANCE",
        TickRuns => "TICK_RUNS",
        Volume => "VOLUME",
        VolumeImbalance => "VOLUME_IMBALANCE",
        VolumeRuns => "VOLUME_RUNS",
        Value => "VALUE",
        ValueImbalance => "VALUE_IMBALANCE",
        ValueRuns => "VALUE_RUNS",
        Millisecond => "MILLISECOND",
        Second => "SECOND",
        Minute => "MINUTE",
        Hour => "HOUR",
        Day => "DAY",
        Week => "WEEK",
        Month => "MONTH",
    }
}

impl BarAggregation {
    pub fn is_time_aggregated(&self) -> bool {
        matches!(
            self,
            BarAggregation::Millisecond
                | BarAggregation::Second
                | BarAggregation::Minute
                | BarAggregation::Hour
                | BarAggregation::Day
                | BarAggregation::Week
                | BarAggregation::Month
        )
    }
}

string_enum! {
    pub enum PriceType {
        Bid => "BID",
        Ask => "ASK",
        Mid => "MID",
        Last => "LAST",
    }
}

string_enum! {
    /// Where bars are aggregated
    pub enum AggregationSource {
        External => "EXTERNAL",
        Internal => "INTERNAL",
    }
}

string_enum! {
    pub enum CurrencyType {
        Fiat => "FIAT",
        Crypto => "CRYPTO",
        CommodityBacked => "COMMODITY_BACKED",
    }
}
