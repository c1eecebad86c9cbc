//! Order statistics over `Decimal` samples.
//!
//! Percentiles use linear interpolation between closest ranks, the same
//! definition most dataframe libraries default to.

use crate::error::AnalyticsError;
use core_types::VectorPoint;
use rust_decimal::prelude::*;

/// The `p`-th percentile (`0 <= p <= 100`) of `values`, or `None` for an empty
/// sample.
pub fn percentile(values: &[Decimal], p: Decimal) -> Result<Option<Decimal>, AnalyticsError> {
    if p < Decimal::ZERO || p > Decimal::ONE_HUNDRED {
        return Err(AnalyticsError::InvalidParameter(
            "percentile".to_string(),
            format!("{} is outside [0, 100]", p),
        ));
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    Ok(percentile_sorted(&sorted, p))
}

/// Like [`percentile`], for an already ascending sample and a validated `p`.
pub(crate) fn percentile_sorted(sorted: &[Decimal], p: Decimal) -> Option<Decimal> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n == 1 {
        return Some(sorted[0]);
    }

    let rank = p / Decimal::ONE_HUNDRED * Decimal::from(n - 1);
    let lo = rank.floor().to_usize()?.min(n - 1);
    let hi = (lo + 1).min(n - 1);
    let frac = rank - Decimal::from(lo);
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// First and third quartile of `values`.
pub fn quartiles(values: &[Decimal]) -> Option<(Decimal, Decimal)> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let q1 = percentile_sorted(&sorted, Decimal::from(25))?;
    let q3 = percentile_sorted(&sorted, Decimal::from(75))?;
    Some((q1, q3))
}

/// The defined vectors of a series, in order.
pub fn defined_vectors(points: &[VectorPoint]) -> Vec<Decimal> {
    points.iter().filter_map(|p| p.vector).collect()
}

/// The simulation threshold: the `p`-th percentile of the strictly positive
/// vectors. `None` when no vector is positive.
pub fn positive_threshold(
    points: &[VectorPoint],
    p: Decimal,
) -> Result<Option<Decimal>, AnalyticsError> {
    let positives: Vec<Decimal> = points
        .iter()
        .filter_map(|point| point.vector)
        .filter(|v| v.is_sign_positive() && !v.is_zero())
        .collect();

    let threshold = percentile(&positives, p)?;
    if threshold.is_none() {
        tracing::warn!(points = points.len(), "No positive vectors; threshold is undefined.");
    }
    Ok(threshold)
}
