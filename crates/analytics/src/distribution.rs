use rust_decimal::prelude::*;
use serde::Serialize;

/// One equal-width bucket of the vector histogram. `upper` is exclusive except
/// for the last bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: Decimal,
    pub upper: Decimal,
    pub count: usize,
}

/// Buckets `values` into `bins` equal-width bins spanning their min..max.
/// A sample whose spread is too narrow to split collapses into one bin.
pub fn histogram(values: &[Decimal], bins: usize) -> Vec<HistogramBin> {
    let (Some(min), Some(max)) = (values.iter().min().copied(), values.iter().max().copied()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }

    let single = || {
        vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }]
    };
    let width = match max
        .checked_sub(min)
        .and_then(|spread| spread.checked_div(Decimal::from(bins)))
    {
        Some(width) if !width.is_zero() => width,
        _ => return single(),
    };
    let mut result: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * Decimal::from(i),
            upper: if i + 1 == bins { max } else { min + width * Decimal::from(i + 1) },
            count: 0,
        })
        .collect();

    for value in values {
        let index = (*value - min)
            .checked_div(width)
            .and_then(|offset| offset.floor().to_usize())
            .unwrap_or(0)
            .min(bins - 1);
        result[index].count += 1;
    }

    result
}
