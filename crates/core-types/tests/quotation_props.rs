//! Property tests for quotation decoding.

use core_types::{math_round, Quotation};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn arb_quotation() -> impl Strategy<Value = Quotation> {
    (-1_000_000i64..1_000_000, 0i32..1_000_000_000).prop_map(|(units, nano)| {
        // Negative prices carry the sign on both parts.
        let nano = if units < 0 { -nano } else { nano };
        Quotation::new(units, nano).unwrap()
    })
}

proptest! {
    /// The result never has more fractional digits than requested.
    #[test]
    fn result_has_requested_scale(q in arb_quotation(), precision in 0u32..10) {
        let value = q.to_decimal(precision).unwrap();
        prop_assert!(value.scale() <= precision);
    }

    /// Rounding moves the value by at most one unit in the last kept place.
    #[test]
    fn result_stays_within_one_unit(q in arb_quotation(), precision in 0u32..10) {
        let value = q.to_decimal(precision).unwrap();
        let tolerance = Decimal::new(1, precision);
        prop_assert!((value - q.raw()).abs() <= tolerance);
    }

    /// Values that already fit the precision are returned unchanged.
    #[test]
    fn exact_values_are_fixed_points(units in -10_000i64..10_000, cents in 0i64..100) {
        let value = Decimal::from(units) + Decimal::new(cents, 2);
        prop_assert_eq!(math_round(value, 2).unwrap(), value);
    }
}
