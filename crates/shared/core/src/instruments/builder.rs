use rust_decimal::Decimal;

use super::{Instrument, InstrumentKind};
use crate::error::{ValidationError, Violations};
use crate::identifiers::{InstrumentId, Symbol};
use crate::values::{Currency, Money, Price, Quantity, UnixNanos};

/// Builder for [`Instrument`]; `build` is the validation gate
#[derive(Debug, Clone)]
pub struct InstrumentBuilder {
    id: InstrumentId,
    raw_symbol: Option<Symbol>,
    kind: InstrumentKind,
    base_currency: Option<Currency>,
    quote_currency: Currency,
    settlement_currency: Option<Currency>,
    is_inverse: bool,
    price_precision: Option<u8>,
    size_precision: Option<u8>,
    price_increment: Price,
    size_increment: Quantity,
    multiplier: Option<Quantity>,
    lot_size: Option<Quantity>,
    max_quantity: Option<Quantity>,
    min_quantity: Option<Quantity>,
    max_notional: Option<Money>,
    min_notional: Option<Money>,
    max_price: Option<Price>,
    min_price: Option<Price>,
    margin_init: Decimal,
    margin_maint: Decimal,
    maker_fee: Decimal,
    taker_fee: Decimal,
    ts_event: UnixNanos,
    ts_init: UnixNanos,
}

impl Instrument {
    pub fn builder(
        id: InstrumentId,
        kind: InstrumentKind,
        quote_currency: Currency,
        price_increment: Price,
        size_increment: Quantity,
    ) -> InstrumentBuilder {
        InstrumentBuilder {
            id,
            raw_symbol: None,
            kind,
            base_currency: None,
            quote_currency,
            settlement_currency: None,
            is_inverse: false,
            price_precision: None,
            size_precision: None,
            price_increment,
            size_increment,
            multiplier: None,
            lot_size: None,
            max_quantity: None,
            min_quantity: None,
            max_notional: None,
            min_notional: None,
            max_price: None,
            min_price: None,
            margin_init: Decimal::ZERO,
            margin_maint: Decimal::ZERO,
            maker_fee: Decimal::ZERO,
            taker_fee: Decimal::ZERO,
            ts_event: 0,
            ts_init: 0,
        }
    }
}

impl InstrumentBuilder {
    /// Venue-native symbol, defaults to the ID's symbol
    pub fn with_raw_symbol(mut self, raw_symbol: Symbol) -> Self {
        self.raw_symbol = Some(raw_symbol);
        self
    }

    pub fn with_base_currency(mut self, currency: Currency) -> Self {
        self.base_currency = Some(currency);
        self
    }

    /// Defaults to the quote currency
    pub fn with_settlement_currency(mut self, currency: Currency) -> Self {
        self.settlement_currency = Some(currency);
        self
    }

    pub fn inverse(mut self, is_inverse: bool) -> Self {
        self.is_inverse = is_inverse;
        self
    }

    /// Declare precisions explicitly; they must match the increments
    pub fn with_precisions(mut self, price_precision: u8, size_precision: u8) -> Self {
        self.price_precision = Some(price_precision);
        self.size_precision = Some(size_precision);
        self
    }

    pub fn with_multiplier(mut self, multiplier: Quantity) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    pub fn with_lot_size(mut self, lot_size: Quantity) -> Self {
        self.lot_size = Some(lot_size);
        self
    }

    pub fn with_quantity_limits(mut self, min: Option<Quantity>, max: Option<Quantity>) -> Self {
        self.min_quantity = min;
        self.max_quantity = max;
        self
    }

    pub fn with_notional_limits(mut self, min: Option<Money>, max: Option<Money>) -> Self {
        self.min_notional = min;
        self.max_notional = max;
        self
    }

    pub fn with_price_limits(mut self, min: Option<Price>, max: Option<Price>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn with_margins(mut self, margin_init: Decimal, margin_maint: Decimal) -> Self {
        self.margin_init = margin_init;
        self.margin_maint = margin_maint;
        self
    }

    /// Fees as rates, negative values are rebates
    pub fn with_fees(mut self, maker_fee: Decimal, taker_fee: Decimal) -> Self {
        self.maker_fee = maker_fee;
        self.taker_fee = taker_fee;
        self
    }

    pub fn with_timestamps(mut self, ts_event: UnixNanos, ts_init: UnixNanos) -> Self {
        self.ts_event = ts_event;
        self.ts_init = ts_init;
        self
    }

    /// Validate every invariant and build the instrument
    pub fn build(self) -> Result<Instrument, ValidationError> {
        let mut v = Violations::new();

        let price_precision = self.price_precision.unwrap_or(self.price_increment.precision());
        let size_precision = self.size_precision.unwrap_or(self.size_increment.precision());

        v.check(price_precision == self.price_increment.precision(), || {
            format!(
                "price_precision {price_precision} != price_increment precision {}",
                self.price_increment.precision()
            )
        });
        v.check(size_precision == self.size_increment.precision(), || {
            format!(
                "size_precision {size_precision} != size_increment precision {}",
                self.size_increment.precision()
            )
        });
        v.check(self.price_increment.is_positive(), || {
            "price_increment must be positive".to_string()
        });
        v.check(self.size_increment.is_positive(), || {
            "size_increment must be positive".to_string()
        });

        let multiplier = match self.multiplier {
            Some(multiplier) => multiplier,
            None => Quantity::from_decimal(Decimal::ONE, 0)?,
        };
        v.check(multiplier.is_positive(), || "multiplier must be positive".to_string());

        if let Some(lot_size) = self.lot_size {
            v.check(lot_size.is_positive(), || "lot_size must be positive".to_string());
            v.check(lot_size.precision() == size_precision, || {
                format!("lot_size precision {} != size_precision {size_precision}", lot_size.precision())
            });
        }

        for (name, qty) in [("min_quantity", self.min_quantity), ("max_quantity", self.max_quantity)] {
            if let Some(qty) = qty {
                v.check(qty.precision() == size_precision, || {
                    format!("{name} precision {} != size_precision {size_precision}", qty.precision())
                });
            }
        }
        if let (Some(min), Some(max)) = (self.min_quantity, self.max_quantity) {
            v.check(min.as_decimal() <= max.as_decimal(), || {
                format!("min_quantity {min} > max_quantity {max}")
            });
        }

        for (name, price) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if let Some(price) = price {
                v.check(price.precision() == price_precision, || {
                    format!("{name} precision {} != price_precision {price_precision}", price.precision())
                });
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            v.check(min.as_decimal() <= max.as_decimal(), || {
                format!("min_price {min} > max_price {max}")
            });
        }

        if self.is_inverse {
            v.check(self.base_currency.is_some(), || {
                "inverse instruments require a base currency".to_string()
            });
        }
        let notional_currency = match (&self.base_currency, self.is_inverse) {
            (Some(base), true) => base,
            _ => &self.quote_currency,
        };
        for (name, money) in [
            ("min_notional", &self.min_notional),
            ("max_notional", &self.max_notional),
        ] {
            if let Some(money) = money {
                v.check(money.currency() == notional_currency, || {
                    format!("{name} currency {} != {notional_currency}", money.currency())
                });
            }
        }
        if let (Some(min), Some(max)) = (&self.min_notional, &self.max_notional) {
            v.check(min.as_decimal() <= max.as_decimal(), || {
                format!("min_notional {min} > max_notional {max}")
            });
        }

        v.check(self.margin_init >= Decimal::ZERO, || {
            "margin_init must be non-negative".to_string()
        });
        v.check(self.margin_maint >= Decimal::ZERO, || {
            "margin_maint must be non-negative".to_string()
        });

        if let InstrumentKind::CryptoFuture {
            activation_ns,
            expiration_ns,
            ..
        } = &self.kind
        {
            v.check(activation_ns < expiration_ns, || {
                format!("activation_ns {activation_ns} must be before expiration_ns {expiration_ns}")
            });
        }

        v.finish()?;

        let settlement_currency = self
            .settlement_currency
            .unwrap_or_else(|| self.quote_currency.clone());
        let raw_symbol = self.raw_symbol.unwrap_or_else(|| self.id.symbol.clone());

        Ok(Instrument {
            id: self.id,
            raw_symbol,
            kind: self.kind,
            base_currency: self.base_currency,
            quote_currency: self.quote_currency,
            settlement_currency,
            is_inverse: self.is_inverse,
            price_precision,
            size_precision,
            price_increment: self.price_increment,
            size_increment: self.size_increment,
            multiplier,
            lot_size: self.lot_size,
            max_quantity: self.max_quantity,
            min_quantity: self.min_quantity,
            max_notional: self.max_notional,
            min_notional: self.min_notional,
            max_price: self.max_price,
            min_price: self.min_price,
            margin_init: self.margin_init,
            margin_maint: self.margin_maint,
            maker_fee: self.maker_fee,
            taker_fee: self.taker_fee,
            ts_event: self.ts_event,
            ts_init: self.ts_init,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn btcusdt() -> InstrumentBuilder {
        Instrument::builder(
            "BTCUSDT.BINANCE".parse().unwrap(),
            InstrumentKind::CurrencyPair,
            Currency::usdt(),
            "0.01".parse().unwrap(),
            "0.000001".parse().unwrap(),
        )
        .with_base_currency(Currency::btc())
    }

    #[test]
    fn test_precisions_derived_from_increments() {
        let instrument = btcusdt().build().unwrap();
        assert_eq!(instrument.price_precision(), 2);
        assert_eq!(instrument.size_precision(), 6);
        assert_eq!(instrument.raw_symbol().as_str(), "BTCUSDT");
        assert_eq!(instrument.settlement_currency(), &Currency::usdt());
        assert_eq!(instrument.multiplier().to_string(), "1");
    }

    #[test]
    fn test_inconsistent_precision_rejected() {
        let err = btcusdt().with_precisions(3, 6).build().unwrap_err();
        assert!(err.mentions("price_precision 3"));
    }

    #[test]
    fn test_inverted_limits_all_reported() {
        let err = btcusdt()
            .with_quantity_limits(
                Some("10.000000".parse().unwrap()),
                Some("1.000000".parse().unwrap()),
            )
            .with_price_limits(Some("2.00".parse().unwrap()), Some("1.00".parse().unwrap()))
            .with_notional_limits(
                Some(Money::from_decimal(dec!(100), Currency::usdt())),
                Some(Money::from_decimal(dec!(10), Currency::usdt())),
            )
            .build()
            .unwrap_err();
        assert_eq!(err.violations().len(), 3);
        assert!(err.mentions("min_quantity"));
        assert!(err.mentions("min_price"));
        assert!(err.mentions("min_notional"));
    }

    #[test]
    fn test_notional_currency_checked() {
        let err = btcusdt()
            .with_notional_limits(Some(Money::from_decimal(dec!(10), Currency::usd())), None)
            .build()
            .unwrap_err();
        assert!(err.mentions("min_notional currency USD"));
    }

    #[test]
    fn test_inverse_requires_base() {
        let err = Instrument::builder(
            "XBTUSD.BITMEX".parse().unwrap(),
            InstrumentKind::CryptoPerpetual,
            Currency::usd(),
            "0.5".parse().unwrap(),
            "1".parse().unwrap(),
        )
        .inverse(true)
        .build()
        .unwrap_err();
        assert!(err.mentions("base currency"));
    }

    #[test]
    fn test_future_expiry_after_activation() {
        let err = Instrument::builder(
            "BTCUSDT_220325.BINANCE".parse().unwrap(),
            InstrumentKind::CryptoFuture {
                underlying: Currency::btc(),
                activation_ns: 10,
                expiration_ns: 5,
            },
            Currency::usdt(),
            "0.01".parse().unwrap(),
            "0.001".parse().unwrap(),
        )
        .build()
        .unwrap_err();
        assert!(err.mentions("activation_ns"));
    }
}
