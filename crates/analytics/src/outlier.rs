use crate::statistics::quartiles;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Interquartile-range trim for the vector distribution.
///
/// Values outside `[Q1 - k*IQR, Q3 + k*IQR]` are dropped, and the trim is
/// repeated on the survivors until nothing more falls outside the fences. The
/// result is therefore a fixed point: filtering it again changes nothing.
/// Only the distribution view uses this; the simulation sees every vector.
#[derive(Debug, Clone, Copy)]
pub struct OutlierFilter {
    k: Decimal,
}

impl OutlierFilter {
    pub fn new(k: Decimal) -> Self {
        Self { k }
    }

    /// The inclusive fences for `values`, or `None` for an empty sample.
    pub fn fences(&self, values: &[Decimal]) -> Option<(Decimal, Decimal)> {
        let (q1, q3) = quartiles(values)?;
        let iqr = q3 - q1;
        Some((q1 - self.k * iqr, q3 + self.k * iqr))
    }

    /// Keeps the values inside the fences, preserving their order.
    pub fn filter(&self, values: &[Decimal]) -> Vec<Decimal> {
        let mut kept = values.to_vec();
        let mut passes = 0usize;

        while let Some((lo, hi)) = self.fences(&kept) {
            let before = kept.len();
            kept.retain(|v| *v >= lo && *v <= hi);
            passes += 1;
            if kept.len() == before {
                break;
            }
        }

        tracing::debug!(
            input = values.len(),
            kept = kept.len(),
            passes,
            "Outlier filter applied."
        );
        kept
    }
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self::new(dec!(1.5))
    }
}
