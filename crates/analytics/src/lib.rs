//! # Candlescope Analytics
//!
//! The derived views of a candle window: the per-bar vector series, the order
//! statistics behind the simulation threshold, the outlier trim and histogram
//! for the distribution chart, and the slider price-delta summary.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O and no retained state. Every function takes an
//!   immutable snapshot of the window and returns a fresh result, so running
//!   the same input twice yields the same output.
//! - **Soft statistics:** empty or all-non-positive samples produce `None` or
//!   empty results rather than errors. Only invalid parameters are errors.

pub mod distribution;
pub mod error;
pub mod outlier;
pub mod report;
pub mod statistics;
pub mod vector;

// Re-export the key components to create a clean, public-facing API.
pub use distribution::{histogram, HistogramBin};
pub use error::AnalyticsError;
pub use outlier::OutlierFilter;
pub use report::{Direction, PriceDelta, PriceRange};
pub use statistics::{defined_vectors, percentile, positive_threshold, quartiles};
pub use vector::{bar_delta, MeanDelta, RangeDelta, VectorFormula, VectorSeriesBuilder};
