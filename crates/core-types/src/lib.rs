//! # Candlescope Core Types
//!
//! The shared vocabulary of the workspace: quotations as the broker sends them,
//! decoded candles, the viewing window and the per-bar series the analytics
//! crates produce. This crate has no knowledge of the network, configuration
//! files or HTTP; every other crate depends on it.

pub mod enums;
pub mod error;
pub mod quotation;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{CandleInterval, NavCommand, WindowPreset};
pub use error::CoreError;
pub use quotation::{math_round, Quotation, MAX_PRECISION};
pub use structs::{BalanceState, Candle, NavigationState, TimeWindow, VectorPoint};
