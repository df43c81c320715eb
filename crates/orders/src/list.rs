use std::fmt;

use kestrel_core::{ClientOrderId, InstrumentId, OrderListId, UnixNanos};

use crate::error::{Result, StateError};
use crate::order::Order;

/// Orders submitted together, e.g. the legs of a bracket
///
/// Each order remains an independent aggregate; the list only groups them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderList {
    id: OrderListId,
    instrument_id: InstrumentId,
    orders: Vec<Order>,
    ts_init: UnixNanos,
}

impl OrderList {
    /// Group `orders` under `id`
    ///
    /// The list must be non-empty, on a single instrument, and every order
    /// must carry `order_list_id == id`.
    pub fn new(id: OrderListId, orders: Vec<Order>) -> Result<Self> {
        let invalid = |reason: String| StateError::InvalidOrderList {
            order_list_id: id.clone(),
            reason,
        };

        let first = orders
            .first()
            .ok_or_else(|| invalid("order list is empty".to_string()))?;
        let instrument_id = first.instrument_id().clone();
        let ts_init = first.ts_init();

        for order in &orders {
            if order.instrument_id() != &instrument_id {
                return Err(invalid(format!(
                    "{} is for {}, expected {instrument_id}",
                    order.client_order_id(),
                    order.instrument_id()
                ))
                .into());
            }
            if order.order_list_id() != Some(&id) {
                return Err(invalid(format!(
                    "{} is not linked to this list",
                    order.client_order_id()
                ))
                .into());
            }
        }

        Ok(Self {
            id,
            instrument_id,
            orders,
            ts_init,
        })
    }

    pub fn id(&self) -> &OrderListId {
        &self.id
    }

    pub fn instrument_id(&self) -> &InstrumentId {
        &self.instrument_id
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// First order in the list; for a bracket this is the entry
    pub fn first(&self) -> &Order {
        // Non-empty by construction
        &self.orders[0]
    }

    pub fn client_order_ids(&self) -> Vec<&ClientOrderId> {
        self.orders.iter().map(Order::client_order_id).collect()
    }

    pub fn ts_init(&self) -> UnixNanos {
        self.ts_init
    }

    pub fn into_orders(self) -> Vec<Order> {
        self.orders
    }
}

impl fmt::Display for OrderList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self
            .orders
            .iter()
            .map(|order| order.client_order_id().as_str())
            .collect();
        write!(
            f,
            "OrderList(id={}, instrument_id={}, orders=[{}])",
            self.id,
            self.instrument_id,
            ids.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderParams;
    use kestrel_core::{ContingencyType, OrderSide};
    use uuid::Uuid;

    fn order(client_order_id: &str, instrument_id: &str, list_id: Option<&str>) -> Order {
        let mut params = OrderParams::new(
            "TRADER-001".parse().unwrap(),
            "S-001".parse().unwrap(),
            instrument_id.parse().unwrap(),
            client_order_id.parse().unwrap(),
            OrderSide::Buy,
            "1".parse().unwrap(),
            Uuid::nil(),
            7,
        );
        if let Some(list_id) = list_id {
            params = params.with_contingency(
                list_id.parse().unwrap(),
                ContingencyType::Oco,
                Vec::new(),
                None,
            );
        }
        Order::market(params).unwrap()
    }

    #[test]
    fn test_valid_list() {
        let list = OrderList::new(
            "OL-1".parse().unwrap(),
            vec![
                order("O-1", "ETHUSDT.BINANCE", Some("OL-1")),
                order("O-2", "ETHUSDT.BINANCE", Some("OL-1")),
            ],
        )
        .unwrap();
        assert_eq!(list.first().client_order_id().as_str(), "O-1");
        assert_eq!(list.ts_init(), 7);
        assert_eq!(
            list.to_string(),
            "OrderList(id=OL-1, instrument_id=ETHUSDT.BINANCE, orders=[O-1, O-2])"
        );
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(OrderList::new("OL-1".parse().unwrap(), Vec::new()).is_err());
    }

    #[test]
    fn test_mixed_instruments_rejected() {
        let err = OrderList::new(
            "OL-1".parse().unwrap(),
            vec![
                order("O-1", "ETHUSDT.BINANCE", Some("OL-1")),
                order("O-2", "BTCUSDT.BINANCE", Some("OL-1")),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("expected ETHUSDT.BINANCE"));
    }

    #[test]
    fn test_unlinked_order_rejected() {
        let err = OrderList::new(
            "OL-1".parse().unwrap(),
            vec![order("O-1", "ETHUSDT.BINANCE", None)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("not linked"));
    }
}
