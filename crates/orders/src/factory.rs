//! Order factory
//!
//! Stamps new orders with the configured trader and strategy, generated
//! client order IDs, event IDs from the [`UuidFactory`] and timestamps from
//! the [`Clock`].

use kestrel_core::{
    ClientOrderId, ContingencyType, InstrumentId, OrderListId, OrderSide, Price, Quantity,
    StrategyId, TraderId, TriggerType, ValidationError,
};
use kestrel_ports::{Clock, UuidFactory};
use log::{info, trace};

use crate::config::OrderFactoryConfig;
use crate::error::Result;
use crate::kind::{LimitParams, TriggerParams};
use crate::list::OrderList;
use crate::order::{Order, OrderParams};

/// Creates orders and order lists for one trader and strategy
pub struct OrderFactory {
    trader_id: TraderId,
    strategy_id: StrategyId,
    clock: Box<dyn Clock>,
    uuid_factory: Box<dyn UuidFactory>,
    order_count: u64,
    list_count: u64,
    use_uuid_client_order_ids: bool,
}

impl OrderFactory {
    pub fn new(
        config: OrderFactoryConfig,
        clock: Box<dyn Clock>,
        uuid_factory: Box<dyn UuidFactory>,
    ) -> Result<Self> {
        let (trader_id, strategy_id) = config.validate()?;
        info!(
            "Order factory for {trader_id}/{strategy_id} using {} (order_count={}, list_count={})",
            clock.name(),
            config.initial_order_count,
            config.initial_list_count
        );

        Ok(Self {
            trader_id,
            strategy_id,
            clock,
            uuid_factory,
            order_count: config.initial_order_count,
            list_count: config.initial_list_count,
            use_uuid_client_order_ids: config.use_uuid_client_order_ids,
        })
    }

    pub fn trader_id(&self) -> &TraderId {
        &self.trader_id
    }

    pub fn strategy_id(&self) -> &StrategyId {
        &self.strategy_id
    }

    pub fn order_count(&self) -> u64 {
        self.order_count
    }

    pub fn list_count(&self) -> u64 {
        self.list_count
    }

    /// Restart ID counting, e.g. after reconciling with persisted state
    pub fn set_counts(&mut self, order_count: u64, list_count: u64) {
        self.order_count = order_count;
        self.list_count = list_count;
    }

    fn dated_id(&self, prefix: &str, count: u64) -> String {
        format!(
            "{prefix}-{}-{}-{}-{count}",
            self.clock.now().format("%Y%m%d-%H%M%S"),
            self.trader_id.tag(),
            self.strategy_id.tag(),
        )
    }

    /// `O-YYYYMMDD-HHMMSS-<trader_tag>-<strategy_tag>-<count>`
    pub fn next_client_order_id(&mut self) -> Result<ClientOrderId> {
        self.order_count += 1;
        let id = if self.use_uuid_client_order_ids {
            self.uuid_factory.generate().to_string()
        } else {
            self.dated_id("O", self.order_count)
        };
        trace!("Generated client order id {id}");
        Ok(ClientOrderId::new(id)?)
    }

    /// `OL-YYYYMMDD-HHMMSS-<trader_tag>-<strategy_tag>-<count>`
    pub fn next_order_list_id(&mut self) -> Result<OrderListId> {
        self.list_count += 1;
        let id = self.dated_id("OL", self.list_count);
        trace!("Generated order list id {id}");
        Ok(OrderListId::new(id)?)
    }

    /// Envelope for a new order with the next client order ID
    ///
    /// Use this with the `Order` constructors for anything the shortcut
    /// methods do not cover (time in force, tags, contingencies).
    pub fn params(
        &mut self,
        instrument_id: InstrumentId,
        side: OrderSide,
        quantity: Quantity,
    ) -> Result<OrderParams> {
        let client_order_id = self.next_client_order_id()?;
        Ok(OrderParams::new(
            self.trader_id.clone(),
            self.strategy_id.clone(),
            instrument_id,
            client_order_id,
            side,
            quantity,
            self.uuid_factory.generate(),
            self.clock.timestamp_ns(),
        ))
    }

    pub fn market(
        &mut self,
        instrument_id: InstrumentId,
        side: OrderSide,
        quantity: Quantity,
    ) -> Result<Order> {
        Order::market(self.params(instrument_id, side, quantity)?)
    }

    pub fn limit(
        &mut self,
        instrument_id: InstrumentId,
        side: OrderSide,
        quantity: Quantity,
        limit: LimitParams,
    ) -> Result<Order> {
        Order::limit(self.params(instrument_id, side, quantity)?, limit)
    }

    pub fn stop_market(
        &mut self,
        instrument_id: InstrumentId,
        side: OrderSide,
        quantity: Quantity,
        trigger: TriggerParams,
    ) -> Result<Order> {
        Order::stop_market(self.params(instrument_id, side, quantity)?, trigger)
    }

    pub fn stop_limit(
        &mut self,
        instrument_id: InstrumentId,
        side: OrderSide,
        quantity: Quantity,
        limit: LimitParams,
        trigger: TriggerParams,
    ) -> Result<Order> {
        Order::stop_limit(self.params(instrument_id, side, quantity)?, limit, trigger)
    }

    pub fn market_if_touched(
        &mut self,
        instrument_id: InstrumentId,
        side: OrderSide,
        quantity: Quantity,
        trigger: TriggerParams,
    ) -> Result<Order> {
        Order::market_if_touched(self.params(instrument_id, side, quantity)?, trigger)
    }

    pub fn limit_if_touched(
        &mut self,
        instrument_id: InstrumentId,
        side: OrderSide,
        quantity: Quantity,
        limit: LimitParams,
        trigger: TriggerParams,
    ) -> Result<Order> {
        Order::limit_if_touched(self.params(instrument_id, side, quantity)?, limit, trigger)
    }

    /// Entry with an attached stop-loss and take-profit
    ///
    /// The entry is a MARKET order, or LIMIT when `entry_price` is given, and
    /// is OTO-linked to both children. The stop-loss (STOP_MARKET) and
    /// take-profit (LIMIT) sit on the opposite side, are reduce-only and
    /// OUO-linked to each other.
    pub fn bracket(
        &mut self,
        instrument_id: InstrumentId,
        side: OrderSide,
        quantity: Quantity,
        entry_price: Option<Price>,
        stop_loss: Price,
        take_profit: Price,
    ) -> Result<OrderList> {
        let ordered = match side {
            OrderSide::Buy => stop_loss.as_decimal() < take_profit.as_decimal(),
            OrderSide::Sell => stop_loss.as_decimal() > take_profit.as_decimal(),
        };
        if !ordered {
            return Err(ValidationError::new(format!(
                "{side} bracket stop_loss {stop_loss} and take_profit {take_profit} are on the wrong sides"
            ))
            .into());
        }

        let list_id = self.next_order_list_id()?;
        let entry_params = self.params(instrument_id.clone(), side, quantity)?;
        let sl_params = self.params(instrument_id.clone(), side.opposite(), quantity)?;
        let tp_params = self.params(instrument_id, side.opposite(), quantity)?;

        let entry_id = entry_params.client_order_id.clone();
        let sl_id = sl_params.client_order_id.clone();
        let tp_id = tp_params.client_order_id.clone();

        let entry_params = entry_params.with_contingency(
            list_id.clone(),
            ContingencyType::Oto,
            vec![sl_id.clone(), tp_id.clone()],
            None,
        );
        let entry = match entry_price {
            Some(price) => Order::limit(entry_params, LimitParams::new(price))?,
            None => Order::market(entry_params)?,
        };

        let stop_loss_order = Order::stop_market(
            sl_params.reduce_only(true).with_contingency(
                list_id.clone(),
                ContingencyType::Ouo,
                vec![tp_id],
                Some(entry_id.clone()),
            ),
            TriggerParams::new(stop_loss, TriggerType::Default),
        )?;
        let take_profit_order = Order::limit(
            tp_params.reduce_only(true).with_contingency(
                list_id.clone(),
                ContingencyType::Ouo,
                vec![sl_id],
                Some(entry_id),
            ),
            LimitParams::new(take_profit),
        )?;

        OrderList::new(list_id, vec![entry, stop_loss_order, take_profit_order])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_clock::{RandomUuidFactory, TestClock};
    use kestrel_core::OrderType;

    // 2024-03-15 12:30:45 UTC
    const NOW_NS: u64 = 1_710_505_845_000_000_000;

    fn factory(config: OrderFactoryConfig) -> OrderFactory {
        OrderFactory::new(
            config,
            Box::new(TestClock::new(NOW_NS)),
            Box::new(RandomUuidFactory),
        )
        .unwrap()
    }

    fn instrument_id() -> InstrumentId {
        "ETHUSDT.BINANCE".parse().unwrap()
    }

    #[test]
    fn test_client_order_id_format() {
        let mut factory = factory(OrderFactoryConfig::default());
        assert_eq!(
            factory.next_client_order_id().unwrap().as_str(),
            "O-20240315-123045-001-001-1"
        );
        assert_eq!(
            factory.next_client_order_id().unwrap().as_str(),
            "O-20240315-123045-001-001-2"
        );
        assert_eq!(
            factory.next_order_list_id().unwrap().as_str(),
            "OL-20240315-123045-001-001-1"
        );
    }

    #[test]
    fn test_counts_continue_from_config() {
        let mut factory = factory(OrderFactoryConfig {
            initial_order_count: 41,
            ..Default::default()
        });
        let id = factory.next_client_order_id().unwrap();
        assert!(id.as_str().ends_with("-42"));
        assert_eq!(factory.order_count(), 42);
    }

    #[test]
    fn test_uuid_client_order_ids() {
        let mut factory = factory(OrderFactoryConfig {
            use_uuid_client_order_ids: true,
            ..Default::default()
        });
        let id = factory.next_client_order_id().unwrap();
        assert_eq!(id.as_str().len(), 36);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = OrderFactory::new(
            OrderFactoryConfig {
                strategy_id: "nodash".to_string(),
                ..Default::default()
            },
            Box::new(TestClock::new(0)),
            Box::new(RandomUuidFactory),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_orders_stamped_from_clock() {
        let mut factory = factory(OrderFactoryConfig::default());
        let order = factory
            .market(instrument_id(), OrderSide::Buy, "1.000".parse().unwrap())
            .unwrap();
        assert_eq!(order.ts_init(), NOW_NS);
        assert_eq!(order.trader_id().as_str(), "TRADER-001");
        assert_eq!(order.order_type(), OrderType::Market);
    }

    #[test]
    fn test_bracket_links() {
        let mut factory = factory(OrderFactoryConfig::default());
        let list = factory
            .bracket(
                instrument_id(),
                OrderSide::Buy,
                "1.000".parse().unwrap(),
                Some("3000.00".parse().unwrap()),
                "2900.00".parse().unwrap(),
                "3200.00".parse().unwrap(),
            )
            .unwrap();

        let [entry, sl, tp] = list.orders() else {
            panic!("expected three orders");
        };
        assert_eq!(entry.order_type(), OrderType::Limit);
        assert_eq!(entry.contingency_type(), ContingencyType::Oto);
        assert_eq!(
            entry.linked_order_ids(),
            &[sl.client_order_id().clone(), tp.client_order_id().clone()]
        );

        assert_eq!(sl.order_type(), OrderType::StopMarket);
        assert_eq!(sl.side(), OrderSide::Sell);
        assert!(sl.reduce_only());
        assert_eq!(sl.contingency_type(), ContingencyType::Ouo);
        assert_eq!(sl.linked_order_ids(), &[tp.client_order_id().clone()]);
        assert_eq!(sl.parent_order_id(), Some(entry.client_order_id()));

        assert_eq!(tp.order_type(), OrderType::Limit);
        assert!(tp.reduce_only());
        assert_eq!(tp.linked_order_ids(), &[sl.client_order_id().clone()]);
        assert_eq!(tp.parent_order_id(), Some(entry.client_order_id()));

        for order in list.orders() {
            assert_eq!(order.order_list_id(), Some(list.id()));
        }
    }

    #[test]
    fn test_bracket_market_entry() {
        let mut factory = factory(OrderFactoryConfig::default());
        let list = factory
            .bracket(
                instrument_id(),
                OrderSide::Sell,
                "1.000".parse().unwrap(),
                None,
                "3100.00".parse().unwrap(),
                "2800.00".parse().unwrap(),
            )
            .unwrap();
        assert_eq!(list.first().order_type(), OrderType::Market);
    }

    #[test]
    fn test_bracket_rejects_inverted_prices() {
        let mut factory = factory(OrderFactoryConfig::default());
        let result = factory.bracket(
            instrument_id(),
            OrderSide::Buy,
            "1.000".parse().unwrap(),
            None,
            "3200.00".parse().unwrap(),
            "2900.00".parse().unwrap(),
        );
        assert!(result.is_err());
        assert_eq!(factory.list_count(), 0);
    }
}
