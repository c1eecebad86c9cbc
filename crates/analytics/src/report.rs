use crate::error::AnalyticsError;
use core_types::{math_round, VectorPoint};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Write;

/// Which way the price moved across a selected range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

/// The price change between two points picked on the range slider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceDelta {
    pub start_price: Decimal,
    pub end_price: Decimal,
    /// Unsigned change, kept to the finer of the two prices' precisions.
    pub absolute: Decimal,
    /// `absolute / start_price * 100`, two digits. Undefined for a zero start.
    pub relative_pct: Option<Decimal>,
    pub direction: Direction,
}

impl PriceDelta {
    /// Computes the change from `points[from]` to `points[to]`.
    pub fn between(points: &[VectorPoint], from: usize, to: usize) -> Result<Self, AnalyticsError> {
        if from > to || to >= points.len() {
            return Err(AnalyticsError::InvalidRange {
                from,
                to,
                len: points.len(),
            });
        }
        let start_price = points[from].price;
        let end_price = points[to].price;

        let precision = start_price.normalize().scale().max(end_price.normalize().scale());
        let absolute = math_round((end_price - start_price).abs(), precision)?;
        let relative_pct = match absolute
            .checked_div(start_price)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        {
            Some(pct) => Some(math_round(pct, 2)?),
            None => None,
        };

        let direction = match start_price.cmp(&end_price) {
            std::cmp::Ordering::Less => Direction::Up,
            std::cmp::Ordering::Greater => Direction::Down,
            std::cmp::Ordering::Equal => Direction::Flat,
        };

        Ok(Self {
            start_price,
            end_price,
            absolute,
            relative_pct,
            direction,
        })
    }

    /// Renders the delta as `+1.5₽ | 3.20%`, signed by direction.
    pub fn summary(&self, unit: &str) -> String {
        let mut text = String::new();
        match self.direction {
            Direction::Up => text.push('+'),
            Direction::Down => text.push('-'),
            Direction::Flat => {}
        }
        let _ = write!(text, "{}{}", self.absolute, unit);
        if let Some(pct) = self.relative_pct {
            let _ = write!(text, " | {}%", pct);
        }
        text
    }
}

/// Lowest and highest price of a window, used for the axis domain and the
/// horizontal reference lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    pub fn of(points: &[VectorPoint]) -> Option<Self> {
        let min = points.iter().map(|p| p.price).min()?;
        let max = points.iter().map(|p| p.price).max()?;
        Some(Self { min, max })
    }
}
