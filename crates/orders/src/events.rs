//! Order events
//!
//! The event log is the source of truth for every order. Each event carries an
//! [`OrderEventHeader`] identifying the order and when the event happened;
//! [`OrderEvent`] is the closed set of events an order accepts.

use std::collections::BTreeMap;

use kestrel_core::{
    AccountId, ClientOrderId, ContingencyType, InstrumentId, LiquiditySide, Money, OrderListId,
    OrderSide, OrderType, ParseError, PositionId, Price, Quantity, StrategyId, TimeInForce,
    TradeId, TraderId, UnixNanos, VenueOrderId,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;
use crate::kind::OrderKind;

/// Identity and timing shared by every order event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEventHeader {
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub instrument_id: InstrumentId,
    pub client_order_id: ClientOrderId,
    pub event_id: Uuid,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

/// Canonical creation event every order is built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInitialized {
    pub header: OrderEventHeader,
    pub side: OrderSide,
    pub quantity: Quantity,
    pub time_in_force: TimeInForce,
    pub expire_time_ns: Option<UnixNanos>,
    pub reduce_only: bool,
    pub kind: OrderKind,
    pub order_list_id: Option<OrderListId>,
    pub contingency_type: ContingencyType,
    pub linked_order_ids: Vec<ClientOrderId>,
    pub parent_order_id: Option<ClientOrderId>,
    pub tags: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDenied {
    pub header: OrderEventHeader,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSubmitted {
    pub header: OrderEventHeader,
    pub account_id: AccountId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAccepted {
    pub header: OrderEventHeader,
    pub venue_order_id: VenueOrderId,
    pub account_id: AccountId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRejected {
    pub header: OrderEventHeader,
    pub account_id: AccountId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCanceled {
    pub header: OrderEventHeader,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderExpired {
    pub header: OrderEventHeader,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTriggered {
    pub header: OrderEventHeader,
}

/// A modification request is in flight at the venue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPendingUpdate {
    pub header: OrderEventHeader,
}

/// A cancel request is in flight at the venue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPendingCancel {
    pub header: OrderEventHeader,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderModifyRejected {
    pub header: OrderEventHeader,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelRejected {
    pub header: OrderEventHeader,
    pub reason: String,
}

/// Venue-confirmed amendment; absent fields are unchanged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdated {
    pub header: OrderEventHeader,
    pub venue_order_id: Option<VenueOrderId>,
    pub account_id: Option<AccountId>,
    pub quantity: Option<Quantity>,
    pub price: Option<Price>,
    pub trigger_price: Option<Price>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilled {
    pub header: OrderEventHeader,
    pub venue_order_id: VenueOrderId,
    pub account_id: AccountId,
    pub trade_id: TradeId,
    pub position_id: Option<PositionId>,
    pub last_qty: Quantity,
    pub last_px: Price,
    pub commission: Option<Money>,
    pub liquidity_side: LiquiditySide,
}

/// Every event an order accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OrderEvent {
    #[serde(rename = "OrderInitialized")]
    Initialized(OrderInitialized),
    #[serde(rename = "OrderDenied")]
    Denied(OrderDenied),
    #[serde(rename = "OrderSubmitted")]
    Submitted(OrderSubmitted),
    #[serde(rename = "OrderAccepted")]
    Accepted(OrderAccepted),
    #[serde(rename = "OrderRejected")]
    Rejected(OrderRejected),
    #[serde(rename = "OrderCanceled")]
    Canceled(OrderCanceled),
    #[serde(rename = "OrderExpired")]
    Expired(OrderExpired),
    #[serde(rename = "OrderTriggered")]
    Triggered(OrderTriggered),
    #[serde(rename = "OrderPendingUpdate")]
    PendingUpdate(OrderPendingUpdate),
    #[serde(rename = "OrderPendingCancel")]
    PendingCancel(OrderPendingCancel),
    #[serde(rename = "OrderModifyRejected")]
    ModifyRejected(OrderModifyRejected),
    #[serde(rename = "OrderCancelRejected")]
    CancelRejected(OrderCancelRejected),
    #[serde(rename = "OrderUpdated")]
    Updated(OrderUpdated),
    #[serde(rename = "OrderFilled")]
    Filled(OrderFilled),
}

macro_rules! impl_from_event {
    ($($event:ident => $variant:ident),+ $(,)?) => {
        $(
            impl From<$event> for OrderEvent {
                fn from(event: $event) -> Self {
                    OrderEvent::$variant(event)
                }
            }
        )+
    };
}

impl_from_event! {
    OrderInitialized => Initialized,
    OrderDenied => Denied,
    OrderSubmitted => Submitted,
    OrderAccepted => Accepted,
    OrderRejected => Rejected,
    OrderCanceled => Canceled,
    OrderExpired => Expired,
    OrderTriggered => Triggered,
    OrderPendingUpdate => PendingUpdate,
    OrderPendingCancel => PendingCancel,
    OrderModifyRejected => ModifyRejected,
    OrderCancelRejected => CancelRejected,
    OrderUpdated => Updated,
    OrderFilled => Filled,
}

impl OrderEvent {
    pub fn header(&self) -> &OrderEventHeader {
        match self {
            OrderEvent::Initialized(e) => &e.header,
            OrderEvent::Denied(e) => &e.header,
            OrderEvent::Submitted(e) => &e.header,
            OrderEvent::Accepted(e) => &e.header,
            OrderEvent::Rejected(e) => &e.header,
            OrderEvent::Canceled(e) => &e.header,
            OrderEvent::Expired(e) => &e.header,
            OrderEvent::Triggered(e) => &e.header,
            OrderEvent::PendingUpdate(e) => &e.header,
            OrderEvent::PendingCancel(e) => &e.header,
            OrderEvent::ModifyRejected(e) => &e.header,
            OrderEvent::CancelRejected(e) => &e.header,
            OrderEvent::Updated(e) => &e.header,
            OrderEvent::Filled(e) => &e.header,
        }
    }

    /// Event type name, as used for the serde `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            OrderEvent::Initialized(_) => "OrderInitialized",
            OrderEvent::Denied(_) => "OrderDenied",
            OrderEvent::Submitted(_) => "OrderSubmitted",
            OrderEvent::Accepted(_) => "OrderAccepted",
            OrderEvent::Rejected(_) => "OrderRejected",
            OrderEvent::Canceled(_) => "OrderCanceled",
            OrderEvent::Expired(_) => "OrderExpired",
            OrderEvent::Triggered(_) => "OrderTriggered",
            OrderEvent::PendingUpdate(_) => "OrderPendingUpdate",
            OrderEvent::PendingCancel(_) => "OrderPendingCancel",
            OrderEvent::ModifyRejected(_) => "OrderModifyRejected",
            OrderEvent::CancelRejected(_) => "OrderCancelRejected",
            OrderEvent::Updated(_) => "OrderUpdated",
            OrderEvent::Filled(_) => "OrderFilled",
        }
    }

    pub fn client_order_id(&self) -> &ClientOrderId {
        &self.header().client_order_id
    }

    pub fn event_id(&self) -> Uuid {
        self.header().event_id
    }

    pub fn ts_event(&self) -> UnixNanos {
        self.header().ts_event
    }
}

const RECORD: &str = "OrderInitialized record";

impl OrderInitialized {
    pub fn order_type(&self) -> OrderType {
        self.kind.order_type()
    }

    /// Flatten to a persistence record
    ///
    /// Leaves are strings, numbers or null. The variant payload is stored as
    /// the JSON-encoded options map under `options`, and `linked_order_ids`
    /// as a JSON-encoded array.
    pub fn to_record(&self) -> BTreeMap<String, Value> {
        let header = &self.header;
        let options: serde_json::Map<String, Value> = self
            .kind
            .to_options()
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        let linked = (!self.linked_order_ids.is_empty()).then(|| {
            Value::from(
                self.linked_order_ids
                    .iter()
                    .map(ClientOrderId::as_str)
                    .collect::<Vec<_>>(),
            )
            .to_string()
        });

        let mut record = BTreeMap::new();
        let mut put = |key: &str, value: Value| {
            record.insert(key.to_string(), value);
        };
        put("trader_id", header.trader_id.as_str().into());
        put("strategy_id", header.strategy_id.as_str().into());
        put("instrument_id", header.instrument_id.to_string().into());
        put("client_order_id", header.client_order_id.as_str().into());
        put("event_id", header.event_id.to_string().into());
        put("ts_event", header.ts_event.into());
        put("ts_init", header.ts_init.into());
        put("order_type", self.order_type().as_str().into());
        put("side", self.side.as_str().into());
        put("quantity", self.quantity.to_string().into());
        put("time_in_force", self.time_in_force.as_str().into());
        put("expire_time_ns", self.expire_time_ns.into());
        put("reduce_only", self.reduce_only.to_string().into());
        put("options", Value::Object(options).to_string().into());
        put(
            "order_list_id",
            self.order_list_id.as_ref().map(|id| id.as_str()).into(),
        );
        put("contingency_type", self.contingency_type.as_str().into());
        put("linked_order_ids", linked.into());
        put(
            "parent_order_id",
            self.parent_order_id.as_ref().map(|id| id.as_str()).into(),
        );
        put("tags", self.tags.clone().into());
        record
    }

    /// Rebuild from a record produced by [`OrderInitialized::to_record`]
    pub fn from_record(record: &BTreeMap<String, Value>) -> Result<Self> {
        let order_type: OrderType = text(record, "order_type")?.parse()?;
        let raw_options = text(record, "options")?;
        let options: BTreeMap<String, String> = serde_json::from_str(raw_options)
            .map_err(|_| ParseError::new(RECORD, raw_options, "options", raw_options))?;

        let header = OrderEventHeader {
            trader_id: text(record, "trader_id")?.parse()?,
            strategy_id: text(record, "strategy_id")?.parse()?,
            instrument_id: text(record, "instrument_id")?.parse()?,
            client_order_id: text(record, "client_order_id")?.parse()?,
            event_id: {
                let raw = text(record, "event_id")?;
                Uuid::parse_str(raw).map_err(|_| ParseError::new(RECORD, raw, "event_id", raw))?
            },
            ts_event: number(record, "ts_event")?,
            ts_init: number(record, "ts_init")?,
        };

        let reduce_only = {
            let raw = text(record, "reduce_only")?;
            raw.parse::<bool>()
                .map_err(|_| ParseError::new(RECORD, raw, "reduce_only", raw))?
        };
        let linked_order_ids = match optional_text(record, "linked_order_ids")? {
            Some(raw) => serde_json::from_str::<Vec<String>>(raw)
                .map_err(|_| ParseError::new(RECORD, raw, "linked_order_ids", raw))?
                .iter()
                .map(|id| id.parse::<ClientOrderId>())
                .collect::<std::result::Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            header,
            side: text(record, "side")?.parse()?,
            quantity: text(record, "quantity")?.parse()?,
            time_in_force: text(record, "time_in_force")?.parse()?,
            expire_time_ns: optional_number(record, "expire_time_ns")?,
            reduce_only,
            kind: OrderKind::from_options(order_type, &options)?,
            order_list_id: optional_text(record, "order_list_id")?
                .map(str::parse)
                .transpose()?,
            contingency_type: text(record, "contingency_type")?.parse()?,
            linked_order_ids,
            parent_order_id: optional_text(record, "parent_order_id")?
                .map(str::parse)
                .transpose()?,
            tags: optional_text(record, "tags")?.map(str::to_string),
        })
    }
}

fn missing(key: &'static str) -> ParseError {
    ParseError::new(RECORD, key, key, "")
}

fn optional_text<'a>(
    record: &'a BTreeMap<String, Value>,
    key: &'static str,
) -> Result<Option<&'a str>> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(ParseError::new(RECORD, key, key, other.to_string()).into()),
    }
}

fn text<'a>(record: &'a BTreeMap<String, Value>, key: &'static str) -> Result<&'a str> {
    optional_text(record, key)?.ok_or_else(|| missing(key).into())
}

fn optional_number(
    record: &BTreeMap<String, Value>,
    key: &'static str,
) -> Result<Option<UnixNanos>> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| ParseError::new(RECORD, key, key, value.to_string()).into()),
    }
}

fn number(record: &BTreeMap<String, Value>, key: &'static str) -> Result<UnixNanos> {
    optional_number(record, key)?.ok_or_else(|| missing(key).into())
}
