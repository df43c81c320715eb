use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::InstrumentKind;
use crate::error::{ValidationError, Violations};
use crate::identifiers::{InstrumentId, Symbol};
use crate::values::{Currency, Money, Price, Quantity, UnixNanos};

/// Static specification of a tradeable instrument at one venue
///
/// Built through [`InstrumentBuilder`], which enforces that precisions match
/// their increments and that every bounded pair is ordered. Instruments are
/// immutable and can be shared freely between threads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    pub(super) id: InstrumentId,
    pub(super) raw_symbol: Symbol,
    pub(super) kind: InstrumentKind,
    pub(super) base_currency: Option<Currency>,
    pub(super) quote_currency: Currency,
    pub(super) settlement_currency: Currency,
    pub(super) is_inverse: bool,
    pub(super) price_precision: u8,
    pub(super) size_precision: u8,
    pub(super) price_increment: Price,
    pub(super) size_increment: Quantity,
    pub(super) multiplier: Quantity,
    pub(super) lot_size: Option<Quantity>,
    pub(super) max_quantity: Option<Quantity>,
    pub(super) min_quantity: Option<Quantity>,
    pub(super) max_notional: Option<Money>,
    pub(super) min_notional: Option<Money>,
    pub(super) max_price: Option<Price>,
    pub(super) min_price: Option<Price>,
    pub(super) margin_init: Decimal,
    pub(super) margin_maint: Decimal,
    pub(super) maker_fee: Decimal,
    pub(super) taker_fee: Decimal,
    pub(super) ts_event: UnixNanos,
    pub(super) ts_init: UnixNanos,
}

impl Instrument {
    pub fn id(&self) -> &InstrumentId {
        &self.id
    }

    pub fn raw_symbol(&self) -> &Symbol {
        &self.raw_symbol
    }

    pub fn kind(&self) -> &InstrumentKind {
        &self.kind
    }

    pub fn base_currency(&self) -> Option<&Currency> {
        self.base_currency.as_ref()
    }

    pub fn quote_currency(&self) -> &Currency {
        &self.quote_currency
    }

    pub fn settlement_currency(&self) -> &Currency {
        &self.settlement_currency
    }

    pub fn is_inverse(&self) -> bool {
        self.is_inverse
    }

    pub fn price_precision(&self) -> u8 {
        self.price_precision
    }

    pub fn size_precision(&self) -> u8 {
        self.size_precision
    }

    pub fn price_increment(&self) -> Price {
        self.price_increment
    }

    pub fn size_increment(&self) -> Quantity {
        self.size_increment
    }

    pub fn multiplier(&self) -> Quantity {
        self.multiplier
    }

    pub fn lot_size(&self) -> Option<Quantity> {
        self.lot_size
    }

    pub fn max_quantity(&self) -> Option<Quantity> {
        self.max_quantity
    }

    pub fn min_quantity(&self) -> Option<Quantity> {
        self.min_quantity
    }

    pub fn max_notional(&self) -> Option<&Money> {
        self.max_notional.as_ref()
    }

    pub fn min_notional(&self) -> Option<&Money> {
        self.min_notional.as_ref()
    }

    pub fn max_price(&self) -> Option<Price> {
        self.max_price
    }

    pub fn min_price(&self) -> Option<Price> {
        self.min_price
    }

    pub fn margin_init(&self) -> Decimal {
        self.margin_init
    }

    pub fn margin_maint(&self) -> Decimal {
        self.margin_maint
    }

    pub fn maker_fee(&self) -> Decimal {
        self.maker_fee
    }

    pub fn taker_fee(&self) -> Decimal {
        self.taker_fee
    }

    pub fn ts_event(&self) -> UnixNanos {
        self.ts_event
    }

    pub fn ts_init(&self) -> UnixNanos {
        self.ts_init
    }

    /// Currency notional values are expressed in
    pub fn notional_currency(&self) -> &Currency {
        match (&self.base_currency, self.is_inverse) {
            (Some(base), true) => base,
            _ => &self.quote_currency,
        }
    }

    /// Creates a price at this instrument's price precision
    pub fn make_price(&self, value: f64) -> Result<Price, ValidationError> {
        Price::new(value, self.price_precision)
    }

    /// Creates a quantity at this instrument's size precision
    pub fn make_qty(&self, value: f64) -> Result<Quantity, ValidationError> {
        Quantity::new(value, self.size_precision)
    }

    /// Notional value of `quantity` at `price`
    ///
    /// Linear: `quantity * multiplier * price` in the quote currency.
    /// Inverse: `quantity * multiplier / price` in the base currency.
    /// Fails when the result is outside the decimal range or the inverse
    /// price is zero.
    pub fn notional_value(
        &self,
        quantity: &Quantity,
        price: &Price,
    ) -> Result<Money, ValidationError> {
        let amount = quantity
            .as_decimal()
            .checked_mul(self.multiplier.as_decimal())
            .and_then(|size| {
                if self.is_inverse {
                    size.checked_div(price.as_decimal())
                } else {
                    size.checked_mul(price.as_decimal())
                }
            })
            .ok_or_else(|| {
                ValidationError::new(format!(
                    "notional of {quantity} at {price} is not representable"
                ))
            })?;
        Ok(Money::from_decimal(amount, self.notional_currency().clone()))
    }

    /// Check an order's quantity and price against this instrument's limits
    ///
    /// Every violated constraint is reported, not just the first.
    pub fn validate_order(
        &self,
        quantity: &Quantity,
        price: Option<&Price>,
    ) -> Result<(), ValidationError> {
        let mut violations = Violations::new();

        if let Some(min) = self.min_quantity {
            violations.check(quantity.as_decimal() >= min.as_decimal(), || {
                format!("quantity {quantity} below min_quantity {min}")
            });
        }
        if let Some(max) = self.max_quantity {
            violations.check(quantity.as_decimal() <= max.as_decimal(), || {
                format!("quantity {quantity} above max_quantity {max}")
            });
        }
        violations.check(quantity.is_multiple_of(&self.size_increment), || {
            format!(
                "quantity {quantity} not a multiple of size_increment {}",
                self.size_increment
            )
        });

        if let Some(price) = price {
            if let Some(min) = self.min_price {
                violations.check(price.as_decimal() >= min.as_decimal(), || {
                    format!("price {price} below min_price {min}")
                });
            }
            if let Some(max) = self.max_price {
                violations.check(price.as_decimal() <= max.as_decimal(), || {
                    format!("price {price} above max_price {max}")
                });
            }
            violations.check(price.is_multiple_of(&self.price_increment), || {
                format!(
                    "price {price} not a multiple of price_increment {}",
                    self.price_increment
                )
            });

            match self.notional_value(quantity, price) {
                Ok(notional) => {
                    if let Some(min) = &self.min_notional {
                        violations.check(
                            notional.checked_cmp(min).is_ok_and(|o| o != Ordering::Less),
                            || format!("notional {notional} below min_notional {min}"),
                        );
                    }
                    if let Some(max) = &self.max_notional {
                        violations.check(
                            notional.checked_cmp(max).is_ok_and(|o| o != Ordering::Greater),
                            || format!("notional {notional} above max_notional {max}"),
                        );
                    }
                }
                Err(e) => violations.extend(e),
            }
        }

        violations.finish()
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(id={}, price_precision={}, size_precision={}, price_increment={}, size_increment={})",
            self.kind.name(),
            self.id,
            self.price_precision,
            self.size_precision,
            self.price_increment,
            self.size_increment
        )
    }
}
