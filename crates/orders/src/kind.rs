//! Per-variant order payload
//!
//! [`OrderKind`] is the closed set of order variants. Shared fields live on the
//! order envelope; only what differs between variants lives here. The flat
//! string options map exists for the persistence boundary only.

use std::collections::BTreeMap;

use kestrel_core::{OrderType, ParseError, Price, Quantity, TriggerType, Violations};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const OPTION_PRICE: &str = "price";
pub const OPTION_TRIGGER_PRICE: &str = "trigger_price";
pub const OPTION_TRIGGER_TYPE: &str = "trigger_type";
pub const OPTION_POST_ONLY: &str = "post_only";
pub const OPTION_DISPLAY_QTY: &str = "display_qty";

/// Limit-price fields shared by LIMIT, STOP_LIMIT and LIMIT_IF_TOUCHED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LimitParams {
    pub price: Price,
    pub post_only: bool,
    /// Visible size of an iceberg order
    pub display_qty: Option<Quantity>,
}

impl LimitParams {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            post_only: false,
            display_qty: None,
        }
    }

    pub fn post_only(mut self, post_only: bool) -> Self {
        self.post_only = post_only;
        self
    }

    pub fn with_display_qty(mut self, display_qty: Quantity) -> Self {
        self.display_qty = Some(display_qty);
        self
    }

    fn check(&self, violations: &mut Violations) {
        violations.check(self.price.is_positive(), || {
            format!("price must be positive, was {}", self.price)
        });
    }

    fn write_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(OPTION_PRICE.to_string(), self.price.to_string());
        options.insert(OPTION_POST_ONLY.to_string(), self.post_only.to_string());
        if let Some(display_qty) = self.display_qty {
            options.insert(OPTION_DISPLAY_QTY.to_string(), display_qty.to_string());
        }
    }

    fn read_options(order_type: OrderType, options: &BTreeMap<String, String>) -> Result<Self> {
        let price = required(order_type, options, OPTION_PRICE)?.parse::<Price>()?;
        let post_only = match options.get(OPTION_POST_ONLY) {
            Some(raw) => raw
                .parse::<bool>()
                .map_err(|_| ParseError::new("OrderKind", order_type.as_str(), OPTION_POST_ONLY, raw))?,
            None => false,
        };
        let display_qty = options
            .get(OPTION_DISPLAY_QTY)
            .map(|raw| raw.parse::<Quantity>())
            .transpose()?;
        Ok(Self {
            price,
            post_only,
            display_qty,
        })
    }
}

/// Trigger fields shared by every conditional variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerParams {
    pub trigger_price: Price,
    pub trigger_type: TriggerType,
}

impl TriggerParams {
    pub fn new(trigger_price: Price, trigger_type: TriggerType) -> Self {
        Self {
            trigger_price,
            trigger_type,
        }
    }

    fn check(&self, violations: &mut Violations) {
        violations.check(self.trigger_price.is_positive(), || {
            format!("trigger_price must be positive, was {}", self.trigger_price)
        });
        violations.check(self.trigger_type != TriggerType::NoTrigger, || {
            "trigger_type must not be NO_TRIGGER".to_string()
        });
    }

    fn write_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            OPTION_TRIGGER_PRICE.to_string(),
            self.trigger_price.to_string(),
        );
        options.insert(
            OPTION_TRIGGER_TYPE.to_string(),
            self.trigger_type.to_string(),
        );
    }

    fn read_options(order_type: OrderType, options: &BTreeMap<String, String>) -> Result<Self> {
        let trigger_price =
            required(order_type, options, OPTION_TRIGGER_PRICE)?.parse::<Price>()?;
        let trigger_type =
            required(order_type, options, OPTION_TRIGGER_TYPE)?.parse::<TriggerType>()?;
        Ok(Self {
            trigger_price,
            trigger_type,
        })
    }
}

fn required<'a>(
    order_type: OrderType,
    options: &'a BTreeMap<String, String>,
    key: &'static str,
) -> Result<&'a str> {
    options
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| ParseError::new("OrderKind", order_type.as_str(), key, "").into())
}

/// Variant-specific order payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    Market,
    Limit(LimitParams),
    StopMarket(TriggerParams),
    StopLimit(LimitParams, TriggerParams),
    MarketIfTouched(TriggerParams),
    LimitIfTouched(LimitParams, TriggerParams),
}

impl OrderKind {
    pub fn order_type(&self) -> OrderType {
        match self {
            OrderKind::Market => OrderType::Market,
            OrderKind::Limit(_) => OrderType::Limit,
            OrderKind::StopMarket(_) => OrderType::StopMarket,
            OrderKind::StopLimit(..) => OrderType::StopLimit,
            OrderKind::MarketIfTouched(_) => OrderType::MarketIfTouched,
            OrderKind::LimitIfTouched(..) => OrderType::LimitIfTouched,
        }
    }

    pub fn limit(&self) -> Option<&LimitParams> {
        match self {
            OrderKind::Limit(limit)
            | OrderKind::StopLimit(limit, _)
            | OrderKind::LimitIfTouched(limit, _) => Some(limit),
            _ => None,
        }
    }

    pub fn trigger(&self) -> Option<&TriggerParams> {
        match self {
            OrderKind::StopMarket(trigger)
            | OrderKind::MarketIfTouched(trigger)
            | OrderKind::StopLimit(_, trigger)
            | OrderKind::LimitIfTouched(_, trigger) => Some(trigger),
            _ => None,
        }
    }

    pub(crate) fn limit_mut(&mut self) -> Option<&mut LimitParams> {
        match self {
            OrderKind::Limit(limit)
            | OrderKind::StopLimit(limit, _)
            | OrderKind::LimitIfTouched(limit, _) => Some(limit),
            _ => None,
        }
    }

    pub(crate) fn trigger_mut(&mut self) -> Option<&mut TriggerParams> {
        match self {
            OrderKind::StopMarket(trigger)
            | OrderKind::MarketIfTouched(trigger)
            | OrderKind::StopLimit(_, trigger)
            | OrderKind::LimitIfTouched(_, trigger) => Some(trigger),
            _ => None,
        }
    }

    pub fn price(&self) -> Option<Price> {
        self.limit().map(|limit| limit.price)
    }

    pub fn trigger_price(&self) -> Option<Price> {
        self.trigger().map(|trigger| trigger.trigger_price)
    }

    pub fn trigger_type(&self) -> Option<TriggerType> {
        self.trigger().map(|trigger| trigger.trigger_type)
    }

    pub fn post_only(&self) -> bool {
        self.limit().is_some_and(|limit| limit.post_only)
    }

    pub fn display_qty(&self) -> Option<Quantity> {
        self.limit().and_then(|limit| limit.display_qty)
    }

    /// Price fills are measured against
    ///
    /// The limit price where there is one, else the trigger price of a
    /// STOP_MARKET or MARKET_IF_TOUCHED order. MARKET orders have none.
    pub fn reference_price(&self) -> Option<Price> {
        self.price().or_else(|| match self {
            OrderKind::StopMarket(trigger) | OrderKind::MarketIfTouched(trigger) => {
                Some(trigger.trigger_price)
            }
            _ => None,
        })
    }

    /// Collect payload violations, checking `display_qty` against `quantity`
    pub(crate) fn check(&self, quantity: &Quantity, violations: &mut Violations) {
        if let Some(limit) = self.limit() {
            limit.check(violations);
            if let Some(display_qty) = limit.display_qty {
                violations.check(display_qty.as_decimal() <= quantity.as_decimal(), || {
                    format!("display_qty {display_qty} exceeds quantity {quantity}")
                });
            }
        }
        if let Some(trigger) = self.trigger() {
            trigger.check(violations);
        }
    }

    /// Flatten into the string options map used at the persistence boundary
    pub fn to_options(&self) -> BTreeMap<String, String> {
        let mut options = BTreeMap::new();
        if let Some(limit) = self.limit() {
            limit.write_options(&mut options);
        }
        if let Some(trigger) = self.trigger() {
            trigger.write_options(&mut options);
        }
        options
    }

    /// Rebuild the payload for `order_type` from a string options map
    ///
    /// Each variant reads and validates only its own keys; unknown keys are
    /// ignored.
    pub fn from_options(order_type: OrderType, options: &BTreeMap<String, String>) -> Result<Self> {
        let kind = match order_type {
            OrderType::Market => OrderKind::Market,
            OrderType::Limit => OrderKind::Limit(LimitParams::read_options(order_type, options)?),
            OrderType::StopMarket => {
                OrderKind::StopMarket(TriggerParams::read_options(order_type, options)?)
            }
            OrderType::StopLimit => OrderKind::StopLimit(
                LimitParams::read_options(order_type, options)?,
                TriggerParams::read_options(order_type, options)?,
            ),
            OrderType::MarketIfTouched => {
                OrderKind::MarketIfTouched(TriggerParams::read_options(order_type, options)?)
            }
            OrderType::LimitIfTouched => OrderKind::LimitIfTouched(
                LimitParams::read_options(order_type, options)?,
                TriggerParams::read_options(order_type, options)?,
            ),
        };

        let mut violations = Violations::new();
        if let Some(limit) = kind.limit() {
            limit.check(&mut violations);
        }
        if let Some(trigger) = kind.trigger() {
            trigger.check(&mut violations);
        }
        violations.finish()?;
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn px(s: &str) -> Price {
        s.parse().unwrap()
    }

    fn lit() -> OrderKind {
        OrderKind::LimitIfTouched(
            LimitParams::new(px("100.00")).with_display_qty("0.5".parse().unwrap()),
            TriggerParams::new(px("99.00"), TriggerType::LastPrice),
        )
    }

    #[test]
    fn test_accessors() {
        let kind = lit();
        assert_eq!(kind.order_type(), OrderType::LimitIfTouched);
        assert_eq!(kind.price(), Some(px("100.00")));
        assert_eq!(kind.trigger_price(), Some(px("99.00")));
        assert_eq!(kind.trigger_type(), Some(TriggerType::LastPrice));
        assert!(!kind.post_only());
        assert_eq!(OrderKind::Market.trigger(), None);
    }

    #[test]
    fn test_reference_price() {
        assert_eq!(lit().reference_price(), Some(px("100.00")));
        let stop = OrderKind::StopMarket(TriggerParams::new(px("95.0"), TriggerType::Default));
        assert_eq!(stop.reference_price(), Some(px("95.0")));
        assert_eq!(OrderKind::Market.reference_price(), None);
    }

    #[test]
    fn test_options_keys() {
        let options = lit().to_options();
        assert_eq!(options.get("price").map(String::as_str), Some("100.00"));
        assert_eq!(options.get("trigger_price").map(String::as_str), Some("99.00"));
        assert_eq!(options.get("trigger_type").map(String::as_str), Some("LAST_PRICE"));
        assert_eq!(options.get("post_only").map(String::as_str), Some("false"));
        assert_eq!(options.get("display_qty").map(String::as_str), Some("0.5"));
        assert!(OrderKind::Market.to_options().is_empty());
    }

    #[test]
    fn test_from_options_rebuilds_each_variant() {
        let kinds = [
            OrderKind::Market,
            OrderKind::Limit(LimitParams::new(px("10.5")).post_only(true)),
            OrderKind::StopMarket(TriggerParams::new(px("9.5"), TriggerType::BidAsk)),
            OrderKind::StopLimit(
                LimitParams::new(px("10.0")),
                TriggerParams::new(px("9.9"), TriggerType::MarkPrice),
            ),
            OrderKind::MarketIfTouched(TriggerParams::new(px("11.0"), TriggerType::MidPoint)),
            lit(),
        ];
        for kind in kinds {
            let rebuilt = OrderKind::from_options(kind.order_type(), &kind.to_options()).unwrap();
            assert_eq!(rebuilt, kind);
        }
    }

    #[test]
    fn test_from_options_missing_key() {
        let err = OrderKind::from_options(OrderType::StopMarket, &BTreeMap::new()).unwrap_err();
        match err {
            Error::Parse(e) => assert_eq!(e.segment, "trigger_price"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_options_rejects_no_trigger() {
        let mut options = lit().to_options();
        options.insert("trigger_type".to_string(), "NO_TRIGGER".to_string());
        let err = OrderKind::from_options(OrderType::LimitIfTouched, &options).unwrap_err();
        assert!(err.to_string().contains("NO_TRIGGER"));
    }

    #[test]
    fn test_check_display_qty() {
        let mut violations = Violations::new();
        lit().check(&"0.4".parse().unwrap(), &mut violations);
        assert!(violations.finish().unwrap_err().mentions("display_qty"));
    }
}
