//! Fixed-precision value types
//!
//! Every value carries an explicit decimal `precision`. Constructors round to
//! that precision using banker's rounding (round half to even), so the stored
//! decimal always has exactly `precision` fractional digits.

mod currency;
mod money;
mod price;
mod quantity;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ValidationError;

pub use currency::Currency;
pub use money::Money;
pub use price::Price;
pub use quantity::Quantity;

/// Maximum number of fractional digits a value may declare
pub const FIXED_PRECISION: u8 = 9;

/// Timestamp in nanoseconds since the UNIX epoch
pub type UnixNanos = u64;

pub(crate) fn check_precision(kind: &str, precision: u8) -> Result<(), ValidationError> {
    if precision > FIXED_PRECISION {
        return Err(ValidationError::new(format!(
            "{kind} precision {precision} exceeds maximum {FIXED_PRECISION}"
        )));
    }
    Ok(())
}

/// Round half-even to `precision` and pin the scale to exactly `precision`
pub(crate) fn fix_scale(value: Decimal, precision: u8) -> Decimal {
    let mut fixed =
        value.round_dp_with_strategy(u32::from(precision), RoundingStrategy::MidpointNearestEven);
    fixed.rescale(u32::from(precision));
    if fixed.is_zero() {
        fixed.set_sign_positive(true);
    }
    fixed
}

pub(crate) fn decimal_from_f64(
    kind: &str,
    value: f64,
    precision: u8,
) -> Result<Decimal, ValidationError> {
    check_precision(kind, precision)?;
    if !value.is_finite() {
        return Err(ValidationError::new(format!("{kind} value {value} is not finite")));
    }
    let decimal = Decimal::from_f64(value)
        .ok_or_else(|| ValidationError::new(format!("{kind} value {value} is out of range")))?;
    Ok(fix_scale(decimal, precision))
}

pub(crate) fn non_negative(
    kind: &str,
    value: Decimal,
    precision: u8,
) -> Result<Decimal, ValidationError> {
    check_precision(kind, precision)?;
    let fixed = fix_scale(value, precision);
    if fixed.is_sign_negative() {
        return Err(ValidationError::new(format!(
            "{kind} must be non-negative, was {fixed}"
        )));
    }
    Ok(fixed)
}

/// Fractional digit count of a canonical decimal string
pub(crate) fn canonical_precision(s: &str) -> usize {
    s.split_once('.').map_or(0, |(_, frac)| frac.len())
}
