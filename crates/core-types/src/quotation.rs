use crate::error::CoreError;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// The largest precision `math_round` accepts. The rounding peeks one digit
/// past the target, and `Decimal` carries at most 28 fractional digits.
pub const MAX_PRECISION: u32 = 27;

const NANO_SCALE: u32 = 9;
const NANO_LIMIT: i32 = 1_000_000_000;

/// The broker's split fixed-point price: whole `units` plus `nano` billionths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quotation {
    pub units: i64,
    pub nano: i32,
}

impl Quotation {
    pub fn new(units: i64, nano: i32) -> Result<Self, CoreError> {
        if nano.unsigned_abs() >= NANO_LIMIT as u32 {
            return Err(CoreError::InvalidInput(
                "nano".to_string(),
                format!("{} is outside (-1e9, 1e9)", nano),
            ));
        }
        Ok(Self { units, nano })
    }

    /// The exact value `units + nano / 1e9`, before any rounding.
    pub fn raw(&self) -> Decimal {
        Decimal::from(self.units) + Decimal::new(i64::from(self.nano), NANO_SCALE)
    }

    /// Decodes the quotation and rounds it to `precision` fractional digits
    /// using [`math_round`].
    pub fn to_decimal(&self, precision: u32) -> Result<Decimal, CoreError> {
        math_round(self.raw(), precision)
    }
}

/// Rounds `value` to `precision` fractional digits by looking at the digit one
/// place beyond the target and pushing the value explicitly down to, or up past,
/// that digit before the final round.
///
/// The direction of the push follows the sign of `value`, where zero counts as
/// negative. The result always carries exactly `precision` fractional digits.
pub fn math_round(value: Decimal, precision: u32) -> Result<Decimal, CoreError> {
    if precision > MAX_PRECISION {
        return Err(CoreError::InvalidInput(
            "precision".to_string(),
            format!("{} exceeds the maximum of {}", precision, MAX_PRECISION),
        ));
    }

    let direction = if value > Decimal::ZERO {
        Decimal::ONE
    } else {
        Decimal::NEGATIVE_ONE
    };
    let dimension = Decimal::new(1, precision + 1);

    let scaled = value.abs().checked_div(dimension).ok_or_else(|| {
        CoreError::Calculation(format!(
            "{} cannot be rounded to {} digits without overflow",
            value, precision
        ))
    })?;
    let digit = scaled.trunc() % Decimal::TEN;

    let adjusted = if digit < Decimal::from(5) {
        value - dimension * digit * direction
    } else {
        value + dimension * (Decimal::TEN - digit) * direction
    };

    let mut rounded = adjusted.round_dp_with_strategy(precision, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(precision);
    Ok(rounded)
}
