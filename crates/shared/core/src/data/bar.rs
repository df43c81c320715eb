//! Bar specifications and OHLCV bars

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::enums::{AggregationSource, BarAggregation, PriceType};
use crate::error::{Error, ParseError, ValidationError, Violations};
use crate::identifiers::InstrumentId;
use crate::values::{Price, Quantity, UnixNanos};

/// Step, aggregation method and price type of a bar series
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BarSpecification {
    step: u64,
    aggregation: BarAggregation,
    price_type: PriceType,
}

impl BarSpecification {
    pub fn new(
        step: u64,
        aggregation: BarAggregation,
        price_type: PriceType,
    ) -> Result<Self, ValidationError> {
        if step == 0 {
            return Err(ValidationError::new("BarSpecification step must be positive"));
        }
        Ok(Self {
            step,
            aggregation,
            price_type,
        })
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn aggregation(&self) -> BarAggregation {
        self.aggregation
    }

    pub fn price_type(&self) -> PriceType {
        self.price_type
    }
}

impl fmt::Display for BarSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.step, self.aggregation, self.price_type)
    }
}

/// Identity of a bar series
///
/// Canonical form: `"<InstrumentId>-<step>-<AGGREGATION>-<PRICE_TYPE>-<SOURCE>"`,
/// e.g. `"BTCUSD.FTX-1-TICK-LAST-EXTERNAL"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BarType {
    instrument_id: InstrumentId,
    spec: BarSpecification,
    source: AggregationSource,
}

impl BarType {
    pub fn new(instrument_id: InstrumentId, spec: BarSpecification, source: AggregationSource) -> Self {
        Self {
            instrument_id,
            spec,
            source,
        }
    }

    pub fn instrument_id(&self) -> &InstrumentId {
        &self.instrument_id
    }

    pub fn spec(&self) -> BarSpecification {
        self.spec
    }

    pub fn step(&self) -> u64 {
        self.spec.step
    }

    pub fn aggregation(&self) -> BarAggregation {
        self.spec.aggregation
    }

    pub fn price_type(&self) -> PriceType {
        self.spec.price_type
    }

    pub fn source(&self) -> AggregationSource {
        self.source
    }
}

impl fmt::Display for BarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.instrument_id, self.spec, self.source)
    }
}

impl FromStr for BarType {
    type Err = Error;

    /// Parsed from the right so instrument IDs containing `-` round-trip
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |segment: &'static str, value: &str| ParseError::new("BarType", s, segment, value);

        let mut parts = s.rsplitn(5, '-');
        let source = parts.next().unwrap_or_default();
        let price_type = parts.next().ok_or_else(|| err("price_type", ""))?;
        let aggregation = parts.next().ok_or_else(|| err("aggregation", ""))?;
        let step = parts.next().ok_or_else(|| err("step", ""))?;
        let instrument_id = parts.next().ok_or_else(|| err("instrument_id", ""))?;

        let instrument_id: InstrumentId = instrument_id
            .parse()
            .map_err(|_| err("instrument_id", instrument_id))?;
        // Canonical digits only: no sign, no leading zero
        let step: u64 = Some(step)
            .filter(|raw| raw.bytes().all(|b| b.is_ascii_digit()) && !raw.starts_with('0'))
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| err("step", step))?;
        let aggregation: BarAggregation = aggregation
            .parse()
            .map_err(|_| err("aggregation", aggregation))?;
        let price_type: PriceType = price_type
            .parse()
            .map_err(|_| err("price_type", price_type))?;
        let source: AggregationSource = source.parse().map_err(|_| err("source", source))?;

        Ok(BarType {
            instrument_id,
            spec: BarSpecification {
                step,
                aggregation,
                price_type,
            },
            source,
        })
    }
}

impl Serialize for BarType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BarType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Aggregated OHLCV bar
///
/// Construction enforces `low <= open, close <= high`; prices share one
/// precision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BarFields")]
pub struct Bar {
    bar_type: BarType,
    open: Price,
    high: Price,
    low: Price,
    close: Price,
    volume: Quantity,
    ts_event: UnixNanos,
    ts_init: UnixNanos,
}

#[derive(Deserialize)]
struct BarFields {
    bar_type: BarType,
    open: Price,
    high: Price,
    low: Price,
    close: Price,
    volume: Quantity,
    ts_event: UnixNanos,
    ts_init: UnixNanos,
}

impl TryFrom<BarFields> for Bar {
    type Error = ValidationError;

    fn try_from(f: BarFields) -> Result<Self, Self::Error> {
        Bar::new(
            f.bar_type, f.open, f.high, f.low, f.close, f.volume, f.ts_event, f.ts_init,
        )
    }
}

impl Bar {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bar_type: BarType,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
        ts_event: UnixNanos,
        ts_init: UnixNanos,
    ) -> Result<Self, ValidationError> {
        let mut violations = Violations::new();
        violations.check(high.as_decimal() >= open.as_decimal(), || {
            format!("high {high} < open {open}")
        });
        violations.check(high.as_decimal() >= low.as_decimal(), || {
            format!("high {high} < low {low}")
        });
        violations.check(high.as_decimal() >= close.as_decimal(), || {
            format!("high {high} < close {close}")
        });
        violations.check(low.as_decimal() <= open.as_decimal(), || {
            format!("low {low} > open {open}")
        });
        violations.check(low.as_decimal() <= close.as_decimal(), || {
            format!("low {low} > close {close}")
        });
        let precision = open.precision();
        violations.check(
            [high, low, close].iter().all(|p| p.precision() == precision),
            || "open, high, low and close must share one precision".to_string(),
        );
        violations.finish()?;

        Ok(Self {
            bar_type,
            open,
            high,
            low,
            close,
            volume,
            ts_event,
            ts_init,
        })
    }

    pub fn bar_type(&self) -> &BarType {
        &self.bar_type
    }

    pub fn open(&self) -> Price {
        self.open
    }

    pub fn high(&self) -> Price {
        self.high
    }

    pub fn low(&self) -> Price {
        self.low
    }

    pub fn close(&self) -> Price {
        self.close
    }

    pub fn volume(&self) -> Quantity {
        self.volume
    }

    pub fn ts_event(&self) -> UnixNanos {
        self.ts_event
    }

    pub fn ts_init(&self) -> UnixNanos {
        self.ts_init
    }
}

impl fmt::Display for Bar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{}",
            self.bar_type, self.open, self.high, self.low, self.close, self.volume, self.ts_event
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar_type() -> BarType {
        "BTCUSD.FTX-1-TICK-LAST-EXTERNAL".parse().unwrap()
    }

    fn px(s: &str) -> Price {
        s.parse().unwrap()
    }

    fn bar(open: &str, high: &str, low: &str, close: &str) -> Result<Bar, ValidationError> {
        Bar::new(
            bar_type(),
            px(open),
            px(high),
            px(low),
            px(close),
            "100000".parse().unwrap(),
            0,
            0,
        )
    }

    #[test]
    fn test_bar_type_format() {
        let spec = BarSpecification::new(1, BarAggregation::Minute, PriceType::Bid).unwrap();
        let bar_type = BarType::new(
            "AUD/USD.SIM".parse().unwrap(),
            spec,
            AggregationSource::Internal,
        );
        assert_eq!(bar_type.to_string(), "AUD/USD.SIM-1-MINUTE-BID-INTERNAL");
    }

    #[test]
    fn test_bar_type_parse() {
        let bar_type = bar_type();
        assert_eq!(bar_type.instrument_id().to_string(), "BTCUSD.FTX");
        assert_eq!(bar_type.step(), 1);
        assert_eq!(bar_type.aggregation(), BarAggregation::Tick);
        assert_eq!(bar_type.price_type(), PriceType::Last);
        assert_eq!(bar_type.source(), AggregationSource::External);
        assert_eq!(bar_type.to_string(), "BTCUSD.FTX-1-TICK-LAST-EXTERNAL");
    }

    #[test]
    fn test_bar_type_parse_hyphenated_instrument() {
        let bar_type: BarType = "BTC-PERP.FTX-100-VOLUME_IMBALANCE-MID-INTERNAL"
            .parse()
            .unwrap();
        assert_eq!(bar_type.instrument_id().symbol.as_str(), "BTC-PERP");
        assert_eq!(bar_type.aggregation(), BarAggregation::VolumeImbalance);
        assert_eq!(
            bar_type.to_string(),
            "BTC-PERP.FTX-100-VOLUME_IMBALANCE-MID-INTERNAL"
        );
    }

    #[test]
    fn test_bar_type_parse_errors_name_segment() {
        let cases = [
            ("BTCUSD.FTX-0-TICK-LAST-EXTERNAL", "step", "0"),
            ("BTCUSD.FTX-x-TICK-LAST-EXTERNAL", "step", "x"),
            ("BTCUSD.FTX-+1-TICK-LAST-EXTERNAL", "step", "+1"),
            ("BTCUSD.FTX-01-TICK-LAST-EXTERNAL", "step", "01"),
            ("BTCUSD.FTX-1-FORTNIGHT-LAST-EXTERNAL", "aggregation", "FORTNIGHT"),
            ("BTCUSD.FTX-1-TICK-CLOSE-EXTERNAL", "price_type", "CLOSE"),
            ("BTCUSD.FTX-1-TICK-LAST-VENDOR", "source", "VENDOR"),
            ("BTCUSD-1-TICK-LAST-EXTERNAL", "instrument_id", "BTCUSD"),
            ("1-TICK-LAST-EXTERNAL", "instrument_id", ""),
        ];
        for (input, segment, value) in cases {
            match input.parse::<BarType>() {
                Err(Error::Parse(err)) => {
                    assert_eq!(err.segment, segment, "input {input}");
                    assert_eq!(err.value, value, "input {input}");
                }
                other => panic!("expected parse error for {input}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_valid_bar() {
        let bar = bar("1.00001", "1.00004", "1.00000", "1.00003").unwrap();
        assert_eq!(bar.high().to_string(), "1.00004");
        assert!(bar.low() <= bar.open() && bar.close() <= bar.high());
    }

    #[test]
    fn test_flat_bar_allowed() {
        assert!(bar("1.00000", "1.00000", "1.00000", "1.00000").is_ok());
    }

    #[test]
    fn test_low_above_high_fails() {
        let err = bar("1.00001", "1.00000", "1.00004", "1.00002").unwrap_err();
        assert!(err.mentions("high 1.00000 < low 1.00004"));
    }

    #[test]
    fn test_close_outside_range_fails() {
        let err = bar("1.00001", "1.00004", "1.00000", "1.00005").unwrap_err();
        assert!(err.mentions("high 1.00004 < close 1.00005"));
        let err = bar("1.00001", "1.00004", "1.00000", "0.99999").unwrap_err();
        assert!(err.mentions("low 1.00000 > close 0.99999"));
    }

    #[test]
    fn test_mixed_precision_fails() {
        let err = bar("1.0", "1.00004", "1.00000", "1.00003").unwrap_err();
        assert!(err.mentions("precision"));
    }

    #[test]
    fn test_deserialize_validates() {
        let bar = bar("1.00001", "1.00004", "1.00000", "1.00003").unwrap();
        let json = serde_json::to_string(&bar).unwrap();
        assert_eq!(serde_json::from_str::<Bar>(&json).unwrap(), bar);

        let broken = json.replace("\"high\":\"1.00004\"", "\"high\":\"0.99000\"");
        assert!(serde_json::from_str::<Bar>(&broken).is_err());
    }
}
