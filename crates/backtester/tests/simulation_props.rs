//! Property tests for the balance fold.
//!
//! The trading rule is a modelling assumption; these tests check the fold's
//! contract (coverage, ordering, determinism, neutral output without signal).

use backtester::BalanceSimulator;
use chrono::{Duration, TimeZone, Utc};
use core_types::VectorPoint;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn arb_series(vectors: impl Strategy<Value = Option<i64>>) -> impl Strategy<Value = Vec<VectorPoint>> {
    prop::collection::vec((1i64..100_000, vectors), 0..80).prop_map(|raw| {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        raw.into_iter()
            .enumerate()
            .map(|(i, (price, vector))| VectorPoint {
                timestamp: start + Duration::minutes(i as i64),
                price: Decimal::new(price, 2),
                vector: vector.map(|v| Decimal::new(v, 2)),
            })
            .collect()
    })
}

proptest! {
    /// Without positive vectors no position is ever taken.
    #[test]
    fn non_positive_vectors_keep_initial_balance(
        points in arb_series(prop::option::of(-10_000i64..=0)),
        threshold in prop::option::of(0i64..1_000),
        fee in 0i64..100,
    ) {
        let initial = Decimal::new(1_000_000, 2);
        let balances = BalanceSimulator::default()
            .simulate(&points, threshold.map(|t| Decimal::new(t, 2)), initial, Decimal::new(fee, 4))
            .unwrap();
        prop_assert!(balances.iter().all(|b| b.balance == initial));
    }

    /// One balance per defined vector, same timestamps, same order.
    #[test]
    fn balances_follow_defined_points(
        points in arb_series(prop::option::of(-1_000i64..1_000)),
        threshold in 0i64..1_000,
    ) {
        let balances = BalanceSimulator::default()
            .simulate(&points, Some(Decimal::new(threshold, 2)), Decimal::ONE_HUNDRED, Decimal::new(5, 4))
            .unwrap();
        let stamps: Vec<_> = points.iter().filter(|p| p.vector.is_some()).map(|p| p.timestamp).collect();
        prop_assert_eq!(balances.iter().map(|b| b.timestamp).collect::<Vec<_>>(), stamps);
    }

    #[test]
    fn simulation_is_deterministic(
        points in arb_series(prop::option::of(-1_000i64..1_000)),
        threshold in 0i64..1_000,
    ) {
        let sim = BalanceSimulator::default();
        let threshold = Some(Decimal::new(threshold, 2));
        let fee = Decimal::new(5, 4);
        prop_assert_eq!(
            sim.simulate(&points, threshold, Decimal::ONE_HUNDRED, fee).unwrap(),
            sim.simulate(&points, threshold, Decimal::ONE_HUNDRED, fee).unwrap()
        );
    }

    /// A prefix of the input yields a prefix of the output.
    #[test]
    fn balance_never_looks_ahead(
        points in arb_series(prop::option::of(-1_000i64..1_000)),
        cut in 0usize..80,
    ) {
        let sim = BalanceSimulator::default();
        let cut = cut.min(points.len());
        let threshold = Some(Decimal::new(300, 2));
        let fee = Decimal::new(5, 4);
        let full = sim.simulate(&points, threshold, Decimal::ONE_HUNDRED, fee).unwrap();
        let head = sim.simulate(&points[..cut], threshold, Decimal::ONE_HUNDRED, fee).unwrap();
        prop_assert_eq!(&full[..head.len()], &head[..]);
    }
}
