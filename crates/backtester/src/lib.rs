//! # Candlescope Balance Simulation
//!
//! Folds a vector series into a balance curve. The fold is strictly
//! sequential: the account after point `i` depends only on the account after
//! point `i - 1` and on point `i` itself, so the curve can be recomputed from
//! the same inputs at any time and always comes out the same.
//!
//! The rule deciding when to enter and leave a position is a `TradingRule`;
//! `ThresholdMomentum` is the rule the dashboard uses.

use crate::error::BacktestError;
use configuration::SimulationParams;
use core_types::{BalanceState, VectorPoint};
use rust_decimal::Decimal;

pub mod error;

/// Cash and instrument units held between two points of the fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Account {
    pub cash: Decimal,
    pub units: Decimal,
}

impl Account {
    pub fn new(initial_balance: Decimal) -> Self {
        Self {
            cash: initial_balance,
            units: Decimal::ZERO,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.units.is_zero()
    }

    /// Cash plus the position marked at `price`.
    pub fn equity(&self, price: Decimal) -> Decimal {
        self.cash + self.units * price
    }
}

/// One step of the simulation.
///
/// Implementations receive only the current point; they must not keep state
/// of their own, since the account is the whole state of the fold.
pub trait TradingRule: Send + Sync {
    fn step(
        &self,
        account: Account,
        price: Decimal,
        vector: Decimal,
        threshold: Decimal,
        fee_rate: Decimal,
    ) -> Account;
}

/// Goes all-in when the vector exceeds the threshold and exits once it drops
/// below `exit_below`. Each entry and exit pays `fee_rate` of the value moved.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdMomentum {
    pub exit_below: Decimal,
}

impl Default for ThresholdMomentum {
    fn default() -> Self {
        Self {
            exit_below: Decimal::ZERO,
        }
    }
}

impl TradingRule for ThresholdMomentum {
    fn step(
        &self,
        account: Account,
        price: Decimal,
        vector: Decimal,
        threshold: Decimal,
        fee_rate: Decimal,
    ) -> Account {
        if account.is_flat() && vector > threshold {
            let fee = account.cash * fee_rate;
            match (account.cash - fee).checked_div(price) {
                Some(units) if price > Decimal::ZERO => Account {
                    cash: Decimal::ZERO,
                    units,
                },
                _ => account,
            }
        } else if !account.is_flat() && vector < self.exit_below {
            let proceeds = account.units * price;
            Account {
                cash: proceeds - proceeds * fee_rate,
                units: Decimal::ZERO,
            }
        } else {
            account
        }
    }
}

/// Runs a `TradingRule` over a vector series.
pub struct BalanceSimulator {
    rule: Box<dyn TradingRule>,
}

impl BalanceSimulator {
    pub fn new(rule: Box<dyn TradingRule>) -> Self {
        Self { rule }
    }

    pub fn from_params(params: &SimulationParams) -> Self {
        Self::new(Box::new(ThresholdMomentum {
            exit_below: params.exit_below,
        }))
    }

    /// Produces one balance per point with a defined vector, in input order.
    ///
    /// Without a threshold there is no signal: the balance stays at
    /// `initial_balance` for every point.
    pub fn simulate(
        &self,
        points: &[VectorPoint],
        threshold: Option<Decimal>,
        initial_balance: Decimal,
        fee_rate: Decimal,
    ) -> Result<Vec<BalanceState>, BacktestError> {
        if initial_balance < Decimal::ZERO {
            return Err(BacktestError::InvalidParameters(format!(
                "initial balance must not be negative, got {}",
                initial_balance
            )));
        }
        if fee_rate < Decimal::ZERO || fee_rate >= Decimal::ONE {
            return Err(BacktestError::InvalidParameters(format!(
                "fee rate must be within [0, 1), got {}",
                fee_rate
            )));
        }

        let defined = points
            .iter()
            .filter_map(|p| p.vector.map(|vector| (p, vector)));

        let Some(threshold) = threshold else {
            tracing::warn!("No threshold; balance is held constant.");
            return Ok(defined
                .map(|(point, _)| BalanceState {
                    timestamp: point.timestamp,
                    balance: initial_balance,
                })
                .collect());
        };

        let mut account = Account::new(initial_balance);
        let mut changes = 0usize;
        let balances = defined
            .map(|(point, vector)| {
                let next = self
                    .rule
                    .step(account, point.price, vector, threshold, fee_rate);
                if next.is_flat() != account.is_flat() {
                    changes += 1;
                }
                account = next;
                BalanceState {
                    timestamp: point.timestamp,
                    balance: account.equity(point.price),
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            points = balances.len(),
            %threshold,
            position_changes = changes,
            "Balance simulation finished."
        );

        Ok(balances)
    }
}

impl Default for BalanceSimulator {
    fn default() -> Self {
        Self::new(Box::new(ThresholdMomentum::default()))
    }
}
