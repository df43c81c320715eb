//! The order aggregate
//!
//! An [`Order`] is a projection of its event log. It is created from an
//! [`OrderInitialized`] event and changes only through [`Order::apply`], which
//! checks an event completely before touching any field.

use std::collections::BTreeMap;
use std::fmt;

use chrono::SecondsFormat;
use kestrel_clock::unix_nanos_to_datetime;
use kestrel_core::{
    AccountId, ClientOrderId, ContingencyType, InstrumentId, LiquiditySide, Money, OrderListId,
    OrderSide, OrderStatus, OrderType, PositionId, Price, Quantity, StrategyId, TimeInForce,
    TradeId, TraderId, TriggerType, UnixNanos, ValidationError, VenueOrderId, Violations,
};
use log::debug;
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Result, StateError};
use crate::events::{OrderEvent, OrderEventHeader, OrderFilled, OrderInitialized, OrderUpdated};
use crate::fsm::OrderStateMachine;
use crate::kind::{LimitParams, OrderKind, TriggerParams};

/// Envelope fields shared by every order variant
///
/// Defaults to GTC, not reduce-only, no contingency and no tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderParams {
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub instrument_id: InstrumentId,
    pub client_order_id: ClientOrderId,
    pub side: OrderSide,
    pub quantity: Quantity,
    pub time_in_force: TimeInForce,
    pub expire_time_ns: Option<UnixNanos>,
    pub reduce_only: bool,
    pub order_list_id: Option<OrderListId>,
    pub contingency_type: ContingencyType,
    pub linked_order_ids: Vec<ClientOrderId>,
    pub parent_order_id: Option<ClientOrderId>,
    pub tags: Option<String>,
    pub init_id: Uuid,
    pub ts_init: UnixNanos,
}

impl OrderParams {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        trader_id: TraderId,
        strategy_id: StrategyId,
        instrument_id: InstrumentId,
        client_order_id: ClientOrderId,
        side: OrderSide,
        quantity: Quantity,
        init_id: Uuid,
        ts_init: UnixNanos,
    ) -> Self {
        Self {
            trader_id,
            strategy_id,
            instrument_id,
            client_order_id,
            side,
            quantity,
            time_in_force: TimeInForce::Gtc,
            expire_time_ns: None,
            reduce_only: false,
            order_list_id: None,
            contingency_type: ContingencyType::NoContingency,
            linked_order_ids: Vec::new(),
            parent_order_id: None,
            tags: None,
            init_id,
            ts_init,
        }
    }

    pub fn with_time_in_force(
        mut self,
        time_in_force: TimeInForce,
        expire_time_ns: Option<UnixNanos>,
    ) -> Self {
        self.time_in_force = time_in_force;
        self.expire_time_ns = expire_time_ns;
        self
    }

    pub fn reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }

    pub fn with_contingency(
        mut self,
        order_list_id: OrderListId,
        contingency_type: ContingencyType,
        linked_order_ids: Vec<ClientOrderId>,
        parent_order_id: Option<ClientOrderId>,
    ) -> Self {
        self.order_list_id = Some(order_list_id);
        self.contingency_type = contingency_type;
        self.linked_order_ids = linked_order_ids;
        self.parent_order_id = parent_order_id;
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Build the creation event for a variant
    pub fn into_init(self, kind: OrderKind) -> OrderInitialized {
        OrderInitialized {
            header: OrderEventHeader {
                trader_id: self.trader_id,
                strategy_id: self.strategy_id,
                instrument_id: self.instrument_id,
                client_order_id: self.client_order_id,
                event_id: self.init_id,
                ts_event: self.ts_init,
                ts_init: self.ts_init,
            },
            side: self.side,
            quantity: self.quantity,
            time_in_force: self.time_in_force,
            expire_time_ns: self.expire_time_ns,
            reduce_only: self.reduce_only,
            kind,
            order_list_id: self.order_list_id,
            contingency_type: self.contingency_type,
            linked_order_ids: self.linked_order_ids,
            parent_order_id: self.parent_order_id,
            tags: self.tags,
        }
    }
}

/// Event-sourced order aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    events: Vec<OrderEvent>,
    trader_id: TraderId,
    strategy_id: StrategyId,
    instrument_id: InstrumentId,
    client_order_id: ClientOrderId,
    venue_order_id: Option<VenueOrderId>,
    venue_order_id_history: Vec<VenueOrderId>,
    position_id: Option<PositionId>,
    account_id: Option<AccountId>,
    trade_ids: Vec<TradeId>,
    side: OrderSide,
    kind: OrderKind,
    quantity: Quantity,
    filled_qty: Quantity,
    leaves_qty: Quantity,
    time_in_force: TimeInForce,
    expire_time_ns: Option<UnixNanos>,
    reduce_only: bool,
    order_list_id: Option<OrderListId>,
    contingency_type: ContingencyType,
    linked_order_ids: Vec<ClientOrderId>,
    parent_order_id: Option<ClientOrderId>,
    tags: Option<String>,
    status: OrderStatus,
    previous_status: Option<OrderStatus>,
    is_triggered: bool,
    ts_triggered: Option<UnixNanos>,
    avg_px: Option<Decimal>,
    slippage: Decimal,
    liquidity_side: LiquiditySide,
    commissions: BTreeMap<String, Money>,
    ts_init: UnixNanos,
    ts_last: UnixNanos,
}

// Construction
impl Order {
    pub fn market(params: OrderParams) -> Result<Order> {
        Self::from_init(params.into_init(OrderKind::Market))
    }

    pub fn limit(params: OrderParams, limit: LimitParams) -> Result<Order> {
        Self::from_init(params.into_init(OrderKind::Limit(limit)))
    }

    pub fn stop_market(params: OrderParams, trigger: TriggerParams) -> Result<Order> {
        Self::from_init(params.into_init(OrderKind::StopMarket(trigger)))
    }

    pub fn stop_limit(
        params: OrderParams,
        limit: LimitParams,
        trigger: TriggerParams,
    ) -> Result<Order> {
        Self::from_init(params.into_init(OrderKind::StopLimit(limit, trigger)))
    }

    pub fn market_if_touched(params: OrderParams, trigger: TriggerParams) -> Result<Order> {
        Self::from_init(params.into_init(OrderKind::MarketIfTouched(trigger)))
    }

    pub fn limit_if_touched(
        params: OrderParams,
        limit: LimitParams,
        trigger: TriggerParams,
    ) -> Result<Order> {
        Self::from_init(params.into_init(OrderKind::LimitIfTouched(limit, trigger)))
    }

    /// Build an order from its creation event
    ///
    /// Every violated construction rule is reported in one [`ValidationError`].
    pub fn from_init(init: OrderInitialized) -> Result<Order> {
        Self::check_init(&init)?;

        let filled_qty = Quantity::zero(init.quantity.precision())?;
        let header = &init.header;
        let order = Order {
            trader_id: header.trader_id.clone(),
            strategy_id: header.strategy_id.clone(),
            instrument_id: header.instrument_id.clone(),
            client_order_id: header.client_order_id.clone(),
            venue_order_id: None,
            venue_order_id_history: Vec::new(),
            position_id: None,
            account_id: None,
            trade_ids: Vec::new(),
            side: init.side,
            kind: init.kind,
            quantity: init.quantity,
            filled_qty,
            leaves_qty: init.quantity,
            time_in_force: init.time_in_force,
            expire_time_ns: init.expire_time_ns,
            reduce_only: init.reduce_only,
            order_list_id: init.order_list_id.clone(),
            contingency_type: init.contingency_type,
            linked_order_ids: init.linked_order_ids.clone(),
            parent_order_id: init.parent_order_id.clone(),
            tags: init.tags.clone(),
            status: OrderStatus::Initialized,
            previous_status: None,
            is_triggered: false,
            ts_triggered: None,
            avg_px: None,
            slippage: Decimal::ZERO,
            liquidity_side: LiquiditySide::NoLiquiditySide,
            commissions: BTreeMap::new(),
            ts_init: header.ts_init,
            ts_last: header.ts_event,
            events: vec![OrderEvent::Initialized(init)],
        };

        debug!("Created order {}", order.info());
        Ok(order)
    }

    /// Rebuild an order by replaying its full event log in order
    pub fn replay(events: impl IntoIterator<Item = OrderEvent>) -> Result<Order> {
        let mut events = events.into_iter();
        let mut order = match events.next() {
            Some(OrderEvent::Initialized(init)) => Self::from_init(init)?,
            Some(other) => {
                return Err(ValidationError::new(format!(
                    "event log must begin with OrderInitialized, found {}",
                    other.name()
                ))
                .into());
            }
            None => return Err(ValidationError::new("event log is empty").into()),
        };
        for event in events {
            order.apply(event)?;
        }
        Ok(order)
    }

    fn check_init(init: &OrderInitialized) -> Result<()> {
        let mut violations = Violations::new();
        let quantity = &init.quantity;
        let order_type = init.kind.order_type();

        violations.check(quantity.is_positive(), || {
            format!("quantity must be positive, was {quantity}")
        });
        init.kind.check(quantity, &mut violations);

        match (init.time_in_force, init.expire_time_ns) {
            (TimeInForce::Gtd, Some(ns)) if ns > 0 => {}
            (TimeInForce::Gtd, _) => {
                violations.push("GTD orders require expire_time_ns > 0");
            }
            (tif, Some(ns)) => {
                violations.push(format!("expire_time_ns {ns} is only valid for GTD, not {tif}"));
            }
            (_, None) => {}
        }
        violations.check(
            !(order_type == OrderType::Market && init.time_in_force == TimeInForce::Gtd),
            || "MARKET orders cannot be GTD".to_string(),
        );

        Ok(violations.finish()?)
    }
}

// Transitions
impl Order {
    /// Apply the next event from the order's log
    ///
    /// The event is checked in full first; on error the order is unchanged.
    pub fn apply(&mut self, event: OrderEvent) -> Result<()> {
        if event.client_order_id() != &self.client_order_id {
            return Err(StateError::OrderMismatch {
                client_order_id: self.client_order_id.clone(),
                event_client_order_id: event.client_order_id().clone(),
            }
            .into());
        }

        if !OrderStateMachine::is_valid_transition(self.status, &event) {
            return Err(self.invalid_transition(&event).into());
        }

        let fill = match &event {
            OrderEvent::Filled(fill) => Some(self.check_fill(fill)?),
            OrderEvent::Triggered(_) => {
                self.check_trigger()?;
                None
            }
            OrderEvent::Updated(update) => {
                self.check_update(update)?;
                None
            }
            _ => None,
        };
        let fill_completes = fill.as_ref().is_some_and(|f| f.leaves_qty.is_zero());
        let next = OrderStateMachine::next_status(
            self.status,
            self.previous_status,
            &event,
            fill_completes,
        )
        .ok_or_else(|| self.invalid_transition(&event))?;

        // Checks are complete; nothing below can fail.
        match &event {
            OrderEvent::Submitted(e) => self.account_id = Some(e.account_id.clone()),
            OrderEvent::Accepted(e) => {
                self.set_venue_order_id(&e.venue_order_id);
                self.account_id = Some(e.account_id.clone());
            }
            OrderEvent::Triggered(e) => {
                self.is_triggered = true;
                self.ts_triggered = Some(e.header.ts_event);
            }
            OrderEvent::Updated(update) => self.commit_update(update),
            OrderEvent::Filled(e) => {
                if let Some(fill) = fill {
                    self.commit_fill(e, fill);
                }
            }
            _ => {}
        }

        debug!(
            "{} {}: {} -> {}",
            self.client_order_id,
            event.name(),
            self.status,
            next
        );
        self.set_status(next);
        self.ts_last = event.ts_event();
        self.events.push(event);
        Ok(())
    }

    fn invalid_transition(&self, event: &OrderEvent) -> StateError {
        StateError::InvalidTransition {
            client_order_id: self.client_order_id.clone(),
            status: self.status,
            event: event.name(),
        }
    }

    fn set_status(&mut self, next: OrderStatus) {
        if next == self.status {
            return;
        }
        // Moving between pending statuses keeps the status to restore
        if !(self.status.is_pending() && next.is_pending()) {
            self.previous_status = Some(self.status);
        }
        self.status = next;
    }

    fn set_venue_order_id(&mut self, venue_order_id: &VenueOrderId) {
        match &self.venue_order_id {
            Some(current) if current == venue_order_id => {}
            Some(current) => {
                self.venue_order_id_history.push(current.clone());
                self.venue_order_id = Some(venue_order_id.clone());
            }
            None => self.venue_order_id = Some(venue_order_id.clone()),
        }
    }

    fn check_trigger(&self) -> Result<()> {
        if !self.order_type().is_conditional() {
            return Err(StateError::NotConditional {
                client_order_id: self.client_order_id.clone(),
                order_type: self.order_type(),
            }
            .into());
        }
        if self.is_triggered {
            return Err(StateError::AlreadyTriggered {
                client_order_id: self.client_order_id.clone(),
            }
            .into());
        }
        Ok(())
    }

    fn check_update(&self, update: &OrderUpdated) -> Result<()> {
        let mut violations = Violations::new();
        let order_type = self.order_type();

        if let Some(quantity) = &update.quantity {
            violations.check(quantity.is_positive(), || {
                format!("updated quantity must be positive, was {quantity}")
            });
            violations.check(
                quantity.as_decimal() >= self.filled_qty.as_decimal(),
                || {
                    format!(
                        "updated quantity {quantity} below filled_qty {}",
                        self.filled_qty
                    )
                },
            );
        }
        if let Some(price) = &update.price {
            violations.check(self.kind.limit().is_some(), || {
                format!("{order_type} orders have no price to update")
            });
            violations.check(price.is_positive(), || {
                format!("updated price must be positive, was {price}")
            });
        }
        if let Some(trigger_price) = &update.trigger_price {
            violations.check(self.kind.trigger().is_some(), || {
                format!("{order_type} orders have no trigger_price to update")
            });
            violations.check(trigger_price.is_positive(), || {
                format!("updated trigger_price must be positive, was {trigger_price}")
            });
        }
        if let (Some(quantity), Some(display_qty)) = (&update.quantity, self.display_qty()) {
            violations.check(display_qty.as_decimal() <= quantity.as_decimal(), || {
                format!("updated quantity {quantity} below display_qty {display_qty}")
            });
        }

        Ok(violations.finish()?)
    }

    fn commit_update(&mut self, update: &OrderUpdated) {
        if let Some(venue_order_id) = &update.venue_order_id {
            self.set_venue_order_id(venue_order_id);
        }
        if let Some(account_id) = &update.account_id {
            self.account_id = Some(account_id.clone());
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
            self.leaves_qty = leaves(quantity, self.filled_qty);
        }
        if let (Some(price), Some(limit)) = (update.price, self.kind.limit_mut()) {
            limit.price = price;
        }
        if let (Some(trigger_price), Some(trigger)) = (update.trigger_price, self.kind.trigger_mut())
        {
            trigger.trigger_price = trigger_price;
        }
    }

    fn check_fill(&self, fill: &OrderFilled) -> Result<FillOutcome> {
        if self.order_type().is_conditional() && !self.is_triggered {
            return Err(StateError::NotTriggered {
                client_order_id: self.client_order_id.clone(),
                order_type: self.order_type(),
            }
            .into());
        }
        if self.trade_ids.contains(&fill.trade_id) {
            return Err(StateError::DuplicateTradeId {
                client_order_id: self.client_order_id.clone(),
                trade_id: fill.trade_id.clone(),
            }
            .into());
        }
        if !fill.last_qty.is_positive() {
            return Err(ValidationError::new(format!(
                "last_qty must be positive, was {}",
                fill.last_qty
            ))
            .into());
        }
        if !fill.last_px.is_positive() {
            return Err(ValidationError::new(format!(
                "last_px must be positive, was {}",
                fill.last_px
            ))
            .into());
        }
        if fill.last_qty.as_decimal() > self.leaves_qty.as_decimal() {
            return Err(StateError::Overfill {
                client_order_id: self.client_order_id.clone(),
                last_qty: fill.last_qty,
                leaves_qty: self.leaves_qty,
            }
            .into());
        }

        let filled_qty = self.filled_qty + fill.last_qty;
        let leaves_qty = leaves(self.quantity, filled_qty);

        // Volume-weighted average over all fills so far
        let prior = self.filled_qty.as_decimal();
        let last = fill.last_qty.as_decimal();
        let avg_px = self
            .avg_px
            .unwrap_or(Decimal::ZERO)
            .checked_mul(prior)
            .zip(fill.last_px.as_decimal().checked_mul(last))
            .and_then(|(before, this)| before.checked_add(this))
            .and_then(|notional| notional.checked_div(filled_qty.as_decimal()))
            .ok_or_else(|| {
                ValidationError::new(format!(
                    "fill notional overflows: {} @ {} after {} filled",
                    fill.last_qty, fill.last_px, self.filled_qty
                ))
            })?;

        let slippage = match self.kind.reference_price() {
            Some(reference) => match self.side {
                OrderSide::Buy => avg_px - reference.as_decimal(),
                OrderSide::Sell => reference.as_decimal() - avg_px,
            },
            None => Decimal::ZERO,
        };

        let commission = match &fill.commission {
            Some(commission) => {
                let code = commission.currency().code().to_string();
                let total = match self.commissions.get(&code) {
                    Some(existing) => existing.checked_add(commission)?,
                    None => commission.clone(),
                };
                Some((code, total))
            }
            None => None,
        };

        Ok(FillOutcome {
            filled_qty,
            leaves_qty,
            avg_px,
            slippage,
            commission,
        })
    }

    fn commit_fill(&mut self, fill: &OrderFilled, outcome: FillOutcome) {
        self.set_venue_order_id(&fill.venue_order_id);
        self.account_id = Some(fill.account_id.clone());
        if let Some(position_id) = &fill.position_id {
            self.position_id = Some(position_id.clone());
        }
        self.trade_ids.push(fill.trade_id.clone());
        self.liquidity_side = fill.liquidity_side;
        self.filled_qty = outcome.filled_qty;
        self.leaves_qty = outcome.leaves_qty;
        self.avg_px = Some(outcome.avg_px);
        self.slippage = outcome.slippage;
        if let Some((code, total)) = outcome.commission {
            self.commissions.insert(code, total);
        }
    }
}

/// Derived fill state, computed before the order is touched
struct FillOutcome {
    filled_qty: Quantity,
    leaves_qty: Quantity,
    avg_px: Decimal,
    slippage: Decimal,
    commission: Option<(String, Money)>,
}

/// `quantity - filled`, clamped at zero
fn leaves(quantity: Quantity, filled: Quantity) -> Quantity {
    quantity
        .checked_sub(filled)
        .or_else(|_| Quantity::zero(quantity.precision().max(filled.precision())))
        .unwrap_or(quantity)
}

// Accessors
impl Order {
    pub fn events(&self) -> &[OrderEvent] {
        &self.events
    }

    pub fn init_event(&self) -> Option<&OrderInitialized> {
        match self.events.first() {
            Some(OrderEvent::Initialized(init)) => Some(init),
            _ => None,
        }
    }

    pub fn last_event(&self) -> Option<&OrderEvent> {
        self.events.last()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn trader_id(&self) -> &TraderId {
        &self.trader_id
    }

    pub fn strategy_id(&self) -> &StrategyId {
        &self.strategy_id
    }

    pub fn instrument_id(&self) -> &InstrumentId {
        &self.instrument_id
    }

    pub fn client_order_id(&self) -> &ClientOrderId {
        &self.client_order_id
    }

    pub fn venue_order_id(&self) -> Option<&VenueOrderId> {
        self.venue_order_id.as_ref()
    }

    /// Venue order IDs the order carried before its current one, oldest first
    pub fn venue_order_id_history(&self) -> &[VenueOrderId] {
        &self.venue_order_id_history
    }

    pub fn position_id(&self) -> Option<&PositionId> {
        self.position_id.as_ref()
    }

    pub fn account_id(&self) -> Option<&AccountId> {
        self.account_id.as_ref()
    }

    pub fn trade_ids(&self) -> &[TradeId] {
        &self.trade_ids
    }

    pub fn last_trade_id(&self) -> Option<&TradeId> {
        self.trade_ids.last()
    }

    pub fn side(&self) -> OrderSide {
        self.side
    }

    pub fn kind(&self) -> &OrderKind {
        &self.kind
    }

    pub fn order_type(&self) -> OrderType {
        self.kind.order_type()
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn filled_qty(&self) -> Quantity {
        self.filled_qty
    }

    pub fn leaves_qty(&self) -> Quantity {
        self.leaves_qty
    }

    pub fn price(&self) -> Option<Price> {
        self.kind.price()
    }

    pub fn trigger_price(&self) -> Option<Price> {
        self.kind.trigger_price()
    }

    pub fn trigger_type(&self) -> Option<TriggerType> {
        self.kind.trigger_type()
    }

    pub fn post_only(&self) -> bool {
        self.kind.post_only()
    }

    pub fn display_qty(&self) -> Option<Quantity> {
        self.kind.display_qty()
    }

    pub fn time_in_force(&self) -> TimeInForce {
        self.time_in_force
    }

    pub fn expire_time_ns(&self) -> Option<UnixNanos> {
        self.expire_time_ns
    }

    pub fn reduce_only(&self) -> bool {
        self.reduce_only
    }

    pub fn order_list_id(&self) -> Option<&OrderListId> {
        self.order_list_id.as_ref()
    }

    pub fn contingency_type(&self) -> ContingencyType {
        self.contingency_type
    }

    pub fn linked_order_ids(&self) -> &[ClientOrderId] {
        &self.linked_order_ids
    }

    pub fn parent_order_id(&self) -> Option<&ClientOrderId> {
        self.parent_order_id.as_ref()
    }

    pub fn tags(&self) -> Option<&str> {
        self.tags.as_deref()
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn previous_status(&self) -> Option<OrderStatus> {
        self.previous_status
    }

    pub fn is_triggered(&self) -> bool {
        self.is_triggered
    }

    pub fn ts_triggered(&self) -> Option<UnixNanos> {
        self.ts_triggered
    }

    /// Volume-weighted average fill price, once filled at all
    pub fn avg_px(&self) -> Option<Decimal> {
        self.avg_px
    }

    /// Signed distance of `avg_px` from the reference price
    ///
    /// Positive is worse than the reference: above it for a BUY, below it
    /// for a SELL.
    pub fn slippage(&self) -> Decimal {
        self.slippage
    }

    pub fn liquidity_side(&self) -> LiquiditySide {
        self.liquidity_side
    }

    /// Accumulated commissions, one entry per currency ordered by code
    pub fn commissions(&self) -> Vec<Money> {
        self.commissions.values().cloned().collect()
    }

    pub fn ts_init(&self) -> UnixNanos {
        self.ts_init
    }

    pub fn ts_last(&self) -> UnixNanos {
        self.ts_last
    }

    pub fn is_buy(&self) -> bool {
        self.side == OrderSide::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.side == OrderSide::Sell
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    pub fn is_closed(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_inflight(&self) -> bool {
        self.status.is_inflight()
    }
}

// Views
impl Order {
    /// Type name used by `Display`, e.g. `LimitIfTouchedOrder`
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            OrderKind::Market => "MarketOrder",
            OrderKind::Limit(_) => "LimitOrder",
            OrderKind::StopMarket(_) => "StopMarketOrder",
            OrderKind::StopLimit(..) => "StopLimitOrder",
            OrderKind::MarketIfTouched(_) => "MarketIfTouchedOrder",
            OrderKind::LimitIfTouched(..) => "LimitIfTouchedOrder",
        }
    }

    /// One-line summary
    ///
    /// `"<SIDE> <QTY> <INSTRUMENT_ID> <TYPE>[ @ <prices>] <TIF>[ <EXPIRE>]"`,
    /// e.g. `"BUY 1.0 BTCUSD.FTX LIMIT_IF_TOUCHED @ 99.00-STOP[LAST_PRICE] 100.00-LIMIT GTC"`.
    pub fn info(&self) -> String {
        let prices = match &self.kind {
            OrderKind::Market => None,
            OrderKind::Limit(limit) => Some(limit.price.to_string()),
            OrderKind::StopMarket(trigger) | OrderKind::MarketIfTouched(trigger) => Some(format!(
                "{}[{}]",
                trigger.trigger_price, trigger.trigger_type
            )),
            OrderKind::StopLimit(limit, trigger) | OrderKind::LimitIfTouched(limit, trigger) => {
                Some(format!(
                    "{}-STOP[{}] {}-LIMIT",
                    trigger.trigger_price, trigger.trigger_type, limit.price
                ))
            }
        };

        let mut info = format!(
            "{} {} {} {}",
            self.side,
            self.quantity,
            self.instrument_id,
            self.order_type()
        );
        if let Some(prices) = prices {
            info.push_str(" @ ");
            info.push_str(&prices);
        }
        info.push(' ');
        info.push_str(self.time_in_force.as_str());
        if let Some(ns) = self.expire_time_ns {
            info.push(' ');
            info.push_str(&unix_nanos_to_datetime(ns).to_rfc3339_opts(SecondsFormat::AutoSi, true));
        }
        info
    }

    /// Flat snapshot for persistence
    ///
    /// Every key is always present; absent values are `null`.
    pub fn to_dict(&self) -> BTreeMap<String, Value> {
        fn text<T: fmt::Display>(value: Option<T>) -> Value {
            value.map_or(Value::Null, |v| Value::String(v.to_string()))
        }

        let linked = (!self.linked_order_ids.is_empty()).then(|| {
            Value::from(
                self.linked_order_ids
                    .iter()
                    .map(ClientOrderId::as_str)
                    .collect::<Vec<_>>(),
            )
            .to_string()
        });
        let commissions = (!self.commissions.is_empty()).then(|| {
            self.commissions
                .values()
                .map(Money::to_string)
                .collect::<Vec<_>>()
                .join(",")
        });

        let mut dict = BTreeMap::new();
        let mut put = |key: &str, value: Value| {
            dict.insert(key.to_string(), value);
        };
        put("trader_id", self.trader_id.as_str().into());
        put("strategy_id", self.strategy_id.as_str().into());
        put("instrument_id", self.instrument_id.to_string().into());
        put("client_order_id", self.client_order_id.as_str().into());
        put("venue_order_id", text(self.venue_order_id.as_ref()));
        put("position_id", text(self.position_id.as_ref()));
        put("account_id", text(self.account_id.as_ref()));
        put("last_trade_id", text(self.last_trade_id()));
        put("type", self.order_type().as_str().into());
        put("side", self.side.as_str().into());
        put("quantity", self.quantity.to_string().into());
        put("price", text(self.price()));
        put("trigger_price", text(self.trigger_price()));
        put("trigger_type", text(self.trigger_type()));
        put("time_in_force", self.time_in_force.as_str().into());
        put("expire_time_ns", self.expire_time_ns.into());
        put("filled_qty", self.filled_qty.to_string().into());
        put("leaves_qty", self.leaves_qty.to_string().into());
        put("avg_px", text(self.avg_px));
        put("slippage", self.slippage.to_string().into());
        put("status", self.status.as_str().into());
        put("is_triggered", self.is_triggered.into());
        put("ts_triggered", self.ts_triggered.into());
        put("post_only", self.post_only().into());
        put("reduce_only", self.reduce_only.into());
        put("display_qty", text(self.display_qty()));
        put("order_list_id", text(self.order_list_id.as_ref()));
        put("contingency_type", self.contingency_type.as_str().into());
        put("linked_order_ids", linked.into());
        put("parent_order_id", text(self.parent_order_id.as_ref()));
        put("tags", self.tags.clone().into());
        put("liquidity_side", self.liquidity_side.as_str().into());
        put("commissions", commissions.into());
        put("ts_init", self.ts_init.into());
        put("ts_last", self.ts_last.into());
        dict
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, status={}, client_order_id={}, venue_order_id={}, tags={})",
            self.type_name(),
            self.info(),
            self.status,
            self.client_order_id,
            self.venue_order_id
                .as_ref()
                .map_or("None", VenueOrderId::as_str),
            self.tags.as_deref().unwrap_or("None"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::*;
    use kestrel_core::Currency;
    use rust_decimal_macros::dec;

    fn params(quantity: &str) -> OrderParams {
        OrderParams::new(
            "TRADER-001".parse().unwrap(),
            "S-001".parse().unwrap(),
            "BTCUSD.FTX".parse().unwrap(),
            "O-1".parse().unwrap(),
            OrderSide::Buy,
            quantity.parse().unwrap(),
            Uuid::nil(),
            1,
        )
    }

    fn header(ts: UnixNanos) -> OrderEventHeader {
        OrderEventHeader {
            trader_id: "TRADER-001".parse().unwrap(),
            strategy_id: "S-001".parse().unwrap(),
            instrument_id: "BTCUSD.FTX".parse().unwrap(),
            client_order_id: "O-1".parse().unwrap(),
            event_id: Uuid::new_v4(),
            ts_event: ts,
            ts_init: ts,
        }
    }

    fn px(s: &str) -> Price {
        s.parse().unwrap()
    }

    fn qty(s: &str) -> Quantity {
        s.parse().unwrap()
    }

    fn accepted(venue_order_id: &str) -> OrderEvent {
        OrderAccepted {
            header: header(2),
            venue_order_id: venue_order_id.parse().unwrap(),
            account_id: "SIM-001".parse().unwrap(),
        }
        .into()
    }

    fn filled(trade_id: &str, last_qty: &str, last_px: &str) -> OrderEvent {
        OrderFilled {
            header: header(5),
            venue_order_id: "V-1".parse().unwrap(),
            account_id: "SIM-001".parse().unwrap(),
            trade_id: trade_id.parse().unwrap(),
            position_id: None,
            last_qty: qty(last_qty),
            last_px: px(last_px),
            commission: Some(Money::from_decimal(dec!(0.10), Currency::usd())),
            liquidity_side: LiquiditySide::Taker,
        }
        .into()
    }

    fn updated(quantity: Option<&str>, price: Option<&str>) -> OrderEvent {
        OrderUpdated {
            header: header(3),
            venue_order_id: None,
            account_id: None,
            quantity: quantity.map(qty),
            price: price.map(px),
            trigger_price: None,
        }
        .into()
    }

    fn limit_order() -> Order {
        Order::limit(params("2.0"), LimitParams::new(px("100.00"))).unwrap()
    }

    #[test]
    fn test_new_order_projection() {
        let order = limit_order();
        assert_eq!(order.status(), OrderStatus::Initialized);
        assert_eq!(order.filled_qty(), qty("0.0"));
        assert_eq!(order.leaves_qty(), qty("2.0"));
        assert_eq!(order.avg_px(), None);
        assert_eq!(order.event_count(), 1);
        assert!(order.init_event().is_some());
    }

    #[test]
    fn test_construction_reports_every_violation() {
        let err = Order::limit(
            params("0.0").with_time_in_force(TimeInForce::Gtd, None),
            LimitParams::new(px("0.00")),
        )
        .unwrap_err();
        let crate::Error::Validation(err) = err else {
            panic!("expected validation error");
        };
        assert!(err.mentions("quantity must be positive"));
        assert!(err.mentions("price must be positive"));
        assert!(err.mentions("GTD"));
        assert_eq!(err.violations().len(), 3);
    }

    #[test]
    fn test_expire_time_requires_gtd() {
        let err = Order::limit(
            params("1.0").with_time_in_force(TimeInForce::Gtc, Some(100)),
            LimitParams::new(px("100.00")),
        )
        .unwrap_err();
        assert!(err.to_string().contains("only valid for GTD"));
    }

    #[test]
    fn test_market_cannot_be_gtd() {
        let err = Order::market(params("1.0").with_time_in_force(TimeInForce::Gtd, Some(100)))
            .unwrap_err();
        assert!(err.to_string().contains("MARKET orders cannot be GTD"));
    }

    #[test]
    fn test_partial_then_full_fill() {
        let mut order = limit_order();
        order.apply(accepted("V-1")).unwrap();
        order.apply(filled("T-1", "0.5", "99.00")).unwrap();
        assert_eq!(order.status(), OrderStatus::PartiallyFilled);
        assert_eq!(order.leaves_qty(), qty("1.5"));

        order.apply(filled("T-2", "1.5", "101.00")).unwrap();
        assert_eq!(order.status(), OrderStatus::Filled);
        assert!(order.leaves_qty().is_zero());
        assert_eq!(order.avg_px(), Some(dec!(100.50)));
        assert_eq!(order.slippage(), dec!(0.50));
        assert_eq!(order.trade_ids().len(), 2);
        assert_eq!(
            order.commissions(),
            vec![Money::from_decimal(dec!(0.20), Currency::usd())]
        );
        assert_eq!(order.liquidity_side(), LiquiditySide::Taker);
    }

    #[test]
    fn test_sell_slippage_sign() {
        let mut params = params("1.0");
        params.side = OrderSide::Sell;
        let mut order = Order::limit(params, LimitParams::new(px("100.00"))).unwrap();
        order.apply(accepted("V-1")).unwrap();
        order.apply(filled("T-1", "1.0", "100.25")).unwrap();
        assert_eq!(order.slippage(), dec!(-0.25));
    }

    #[test]
    fn test_market_order_has_zero_slippage() {
        let mut order = Order::market(params("1.0")).unwrap();
        order.apply(accepted("V-1")).unwrap();
        order.apply(filled("T-1", "1.0", "57000.00")).unwrap();
        assert_eq!(order.slippage(), Decimal::ZERO);
        assert_eq!(order.avg_px(), Some(dec!(57000)));
    }

    #[test]
    fn test_overfill_leaves_order_unchanged() {
        let mut order = limit_order();
        order.apply(accepted("V-1")).unwrap();
        let before = order.clone();

        let err = order.apply(filled("T-1", "2.5", "100.00")).unwrap_err();
        assert!(matches!(err, crate::Error::State(StateError::Overfill { .. })));
        assert_eq!(order, before);
    }

    #[test]
    fn test_fill_notional_overflow_leaves_order_unchanged() {
        let mut order = Order::limit(
            params("100000000000000000000"),
            LimitParams::new(px("10000000000.00")),
        )
        .unwrap();
        order.apply(accepted("V-1")).unwrap();
        let before = order.clone();

        let err = order
            .apply(filled("T-1", "100000000000000000000", "10000000000.00"))
            .unwrap_err();
        assert!(matches!(
            &err,
            crate::Error::Validation(e) if e.mentions("fill notional overflows")
        ));
        assert_eq!(order, before);
    }

    #[test]
    fn test_duplicate_trade_id() {
        let mut order = limit_order();
        order.apply(accepted("V-1")).unwrap();
        order.apply(filled("T-1", "0.5", "100.00")).unwrap();
        let err = order.apply(filled("T-1", "0.5", "100.00")).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::State(StateError::DuplicateTradeId { .. })
        ));
    }

    #[test]
    fn test_update_quantity_and_price() {
        let mut order = limit_order();
        order.apply(accepted("V-1")).unwrap();
        order.apply(filled("T-1", "0.5", "100.00")).unwrap();
        order.apply(updated(Some("3.0"), Some("101.00"))).unwrap();

        assert_eq!(order.quantity(), qty("3.0"));
        assert_eq!(order.leaves_qty(), qty("2.5"));
        assert_eq!(order.price(), Some(px("101.00")));
        assert_eq!(order.status(), OrderStatus::PartiallyFilled);
    }

    #[test]
    fn test_update_below_filled_is_rejected() {
        let mut order = limit_order();
        order.apply(accepted("V-1")).unwrap();
        order.apply(filled("T-1", "1.5", "100.00")).unwrap();
        let err = order.apply(updated(Some("1.0"), None)).unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));
        assert_eq!(order.quantity(), qty("2.0"));
    }

    #[test]
    fn test_update_price_on_market_is_rejected() {
        let mut order = Order::market(params("1.0")).unwrap();
        let err = order.apply(updated(None, Some("1.00"))).unwrap_err();
        assert!(err.to_string().contains("no price to update"));
    }

    #[test]
    fn test_pending_update_restored_by_update() {
        let mut order = limit_order();
        order.apply(accepted("V-1")).unwrap();
        order
            .apply(OrderPendingUpdate { header: header(3) }.into())
            .unwrap();
        assert_eq!(order.status(), OrderStatus::PendingUpdate);

        order.apply(updated(Some("2.5"), None)).unwrap();
        assert_eq!(order.status(), OrderStatus::Accepted);
    }

    #[test]
    fn test_cancel_rejected_restores_status() {
        let mut order = limit_order();
        order.apply(accepted("V-1")).unwrap();
        order
            .apply(OrderPendingUpdate { header: header(3) }.into())
            .unwrap();
        order
            .apply(OrderPendingCancel { header: header(4) }.into())
            .unwrap();
        order
            .apply(
                OrderCancelRejected {
                    header: header(5),
                    reason: "too late".to_string(),
                }
                .into(),
            )
            .unwrap();
        assert_eq!(order.status(), OrderStatus::Accepted);
    }

    #[test]
    fn test_venue_order_id_history() {
        let mut order = limit_order();
        order.apply(accepted("V-1")).unwrap();
        order
            .apply(
                OrderUpdated {
                    header: header(3),
                    venue_order_id: Some("V-2".parse().unwrap()),
                    account_id: None,
                    quantity: None,
                    price: None,
                    trigger_price: None,
                }
                .into(),
            )
            .unwrap();
        assert_eq!(order.venue_order_id().unwrap().as_str(), "V-2");
        assert_eq!(order.venue_order_id_history().len(), 1);
        assert_eq!(order.venue_order_id_history()[0].as_str(), "V-1");
    }

    #[test]
    fn test_trigger_on_limit_is_rejected() {
        let mut order = limit_order();
        order.apply(accepted("V-1")).unwrap();
        let err = order
            .apply(OrderTriggered { header: header(3) }.into())
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::State(StateError::NotConditional { .. })
        ));
    }

    #[test]
    fn test_event_for_other_order_is_rejected() {
        let mut order = limit_order();
        let mut other = header(2);
        other.client_order_id = "O-2".parse().unwrap();
        let err = order
            .apply(OrderCanceled { header: other }.into())
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::State(StateError::OrderMismatch { .. })
        ));
    }

    #[test]
    fn test_replay_rebuilds_projection() {
        let mut order = limit_order();
        order.apply(accepted("V-1")).unwrap();
        order.apply(filled("T-1", "0.5", "99.00")).unwrap();

        let replayed = Order::replay(order.events().to_vec()).unwrap();
        assert_eq!(replayed, order);
    }

    #[test]
    fn test_replay_requires_initialized_first() {
        assert!(Order::replay(Vec::new()).is_err());
        assert!(Order::replay(vec![accepted("V-1")]).is_err());
    }

    #[test]
    fn test_info_formats() {
        assert_eq!(limit_order().info(), "BUY 2.0 BTCUSD.FTX LIMIT @ 100.00 GTC");
        assert_eq!(
            Order::market(params("1.0")).unwrap().info(),
            "BUY 1.0 BTCUSD.FTX MARKET GTC"
        );

        let stop = Order::stop_market(
            params("1.0"),
            TriggerParams::new(px("99.00"), TriggerType::LastPrice),
        )
        .unwrap();
        assert_eq!(stop.info(), "BUY 1.0 BTCUSD.FTX STOP_MARKET @ 99.00[LAST_PRICE] GTC");

        let stop_limit = Order::stop_limit(
            params("1.0").with_time_in_force(TimeInForce::Gtd, Some(1_704_067_200_000_000_000)),
            LimitParams::new(px("100.00")),
            TriggerParams::new(px("99.00"), TriggerType::BidAsk),
        )
        .unwrap();
        assert_eq!(
            stop_limit.info(),
            "BUY 1.0 BTCUSD.FTX STOP_LIMIT @ 99.00-STOP[BID_ASK] 100.00-LIMIT GTD 2024-01-01T00:00:00Z"
        );
    }

    #[test]
    fn test_display() {
        let order = limit_order();
        assert_eq!(
            order.to_string(),
            "LimitOrder(BUY 2.0 BTCUSD.FTX LIMIT @ 100.00 GTC, status=INITIALIZED, \
             client_order_id=O-1, venue_order_id=None, tags=None)"
        );
    }

    #[test]
    fn test_to_dict_has_every_key() {
        let dict = Order::market(params("1.0")).unwrap().to_dict();
        assert_eq!(dict.len(), 35);
        assert_eq!(dict["price"], Value::Null);
        assert_eq!(dict["avg_px"], Value::Null);
        assert_eq!(dict["type"], "MARKET");
        assert_eq!(dict["is_triggered"], false);
        for value in dict.values() {
            assert!(!value.is_object() && !value.is_array());
        }
    }

    #[test]
    fn test_to_dict_linked_ids_are_json_encoded() {
        let order = Order::market(params("1.0").with_contingency(
            "OL-1".parse().unwrap(),
            ContingencyType::Oco,
            vec!["A,B".parse().unwrap(), "C".parse().unwrap()],
            None,
        ))
        .unwrap();
        let dict = order.to_dict();
        let raw = dict["linked_order_ids"].as_str().unwrap();
        let ids: Vec<String> = serde_json::from_str(raw).unwrap();
        assert_eq!(ids, ["A,B", "C"]);
    }
}
