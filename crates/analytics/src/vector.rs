use crate::error::AnalyticsError;
use configuration::{FormulaKind, WINDOW_SIZE_RANGE};
use core_types::{Candle, VectorPoint};
use rust_decimal::Decimal;

/// Turns a full trailing window of bars into one signed percentage.
///
/// Implementations must only look at the slice they are given; the builder
/// guarantees the slice ends at the bar being evaluated.
pub trait VectorFormula: Send + Sync {
    fn compute(&self, window: &[Candle]) -> Option<Decimal>;
}

/// `(close - open) / high * 100` of a single bar.
pub fn bar_delta(candle: &Candle) -> Option<Decimal> {
    candle
        .close
        .checked_sub(candle.open)?
        .checked_div(candle.high)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// Move from the first bar's open to the last bar's close, relative to the
/// highest high in the window. For a one-bar window this is [`bar_delta`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeDelta;

impl VectorFormula for RangeDelta {
    fn compute(&self, window: &[Candle]) -> Option<Decimal> {
        let first = window.first()?;
        let last = window.last()?;
        let high = window.iter().map(|c| c.high).max()?;
        last.close
            .checked_sub(first.open)?
            .checked_div(high)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }
}

/// Mean of the per-bar deltas. Undefined if any bar's delta is.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanDelta;

impl VectorFormula for MeanDelta {
    fn compute(&self, window: &[Candle]) -> Option<Decimal> {
        if window.is_empty() {
            return None;
        }
        let sum = window
            .iter()
            .try_fold(Decimal::ZERO, |acc, bar| acc.checked_add(bar_delta(bar)?))?;
        sum.checked_div(Decimal::from(window.len()))
    }
}

/// Derives the per-bar vector series from an ordered run of bars.
pub struct VectorSeriesBuilder {
    formula: Box<dyn VectorFormula>,
}

impl VectorSeriesBuilder {
    pub fn new(formula: Box<dyn VectorFormula>) -> Self {
        Self { formula }
    }

    pub fn from_kind(kind: FormulaKind) -> Self {
        match kind {
            FormulaKind::RangeDelta => Self::new(Box::new(RangeDelta)),
            FormulaKind::MeanDelta => Self::new(Box::new(MeanDelta)),
        }
    }

    /// Produces one point per bar. The first `window_size - 1` points have no
    /// vector; every later vector depends only on the bars up to and including
    /// its own.
    pub fn build(
        &self,
        bars: &[Candle],
        window_size: usize,
    ) -> Result<Vec<VectorPoint>, AnalyticsError> {
        if !WINDOW_SIZE_RANGE.contains(&window_size) {
            return Err(AnalyticsError::InvalidWindowSize {
                size: window_size,
                min: *WINDOW_SIZE_RANGE.start(),
                max: *WINDOW_SIZE_RANGE.end(),
            });
        }

        let points = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                let vector = if i + 1 >= window_size {
                    self.formula.compute(&bars[i + 1 - window_size..=i])
                } else {
                    None
                };
                VectorPoint {
                    timestamp: bar.timestamp,
                    price: bar.open,
                    vector,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            bars = bars.len(),
            window_size,
            defined = points.iter().filter(|p| p.vector.is_some()).count(),
            "Vector series built."
        );

        Ok(points)
    }
}

impl Default for VectorSeriesBuilder {
    fn default() -> Self {
        Self::from_kind(FormulaKind::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn bar(minute: i64, open: Decimal, close: Decimal, high: Decimal) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minute),
            open,
            close,
            high,
            low: open.min(close),
        }
    }

    #[test]
    fn single_bar_window_matches_per_bar_delta() {
        let bars = vec![bar(0, dec!(100), dec!(105), dec!(125))];
        let points = VectorSeriesBuilder::default().build(&bars, 1).unwrap();
        assert_eq!(points[0].vector, Some(dec!(4)));
        assert_eq!(points[0].price, dec!(100));
    }

    #[test]
    fn leading_points_are_undefined() {
        let bars: Vec<_> = (0..5).map(|i| bar(i, dec!(10), dec!(11), dec!(12))).collect();
        let points = VectorSeriesBuilder::default().build(&bars, 3).unwrap();
        assert_eq!(points.len(), 5);
        assert!(points[..2].iter().all(|p| p.vector.is_none()));
        assert!(points[2..].iter().all(|p| p.vector.is_some()));
    }

    #[test]
    fn range_delta_spans_the_whole_window() {
        let bars = vec![
            bar(0, dec!(100), dec!(102), dec!(103)),
            bar(1, dec!(102), dec!(110), dec!(200)),
        ];
        let points = VectorSeriesBuilder::default().build(&bars, 2).unwrap();
        // (110 - 100) / 200 * 100
        assert_eq!(points[1].vector, Some(dec!(5)));
    }

    #[test]
    fn mean_delta_averages_bar_deltas() {
        let bars = vec![
            bar(0, dec!(100), dec!(110), dec!(100)),
            bar(1, dec!(100), dec!(90), dec!(100)),
        ];
        let builder = VectorSeriesBuilder::from_kind(FormulaKind::MeanDelta);
        let points = builder.build(&bars, 2).unwrap();
        assert_eq!(points[1].vector, Some(Decimal::ZERO));
    }

    #[test]
    fn zero_high_leaves_vector_undefined() {
        let bars = vec![bar(0, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)];
        let points = VectorSeriesBuilder::default().build(&bars, 1).unwrap();
        assert!(points[0].vector.is_none());
    }

    #[test]
    fn overflowing_percentage_leaves_vector_undefined() {
        let tiny = Decimal::new(1, 9);
        let bars = vec![bar(0, Decimal::from(-9_000_000_000_000_000_000i64), tiny, tiny)];
        for kind in [FormulaKind::RangeDelta, FormulaKind::MeanDelta] {
            let points = VectorSeriesBuilder::from_kind(kind).build(&bars, 1).unwrap();
            assert!(points[0].vector.is_none());
        }
    }

    #[test]
    fn fewer_bars_than_window_yields_all_undefined() {
        let bars = vec![bar(0, dec!(1), dec!(2), dec!(2))];
        let points = VectorSeriesBuilder::default().build(&bars, 4).unwrap();
        assert_eq!(points.len(), 1);
        assert!(points[0].vector.is_none());
    }

    #[test]
    fn rejects_out_of_range_window() {
        let builder = VectorSeriesBuilder::default();
        assert!(matches!(
            builder.build(&[], 0),
            Err(AnalyticsError::InvalidWindowSize { size: 0, .. })
        ));
        assert!(builder.build(&[], 11).is_err());
    }
}
