//! # Candlescope Engine
//!
//! Wires the stages of one chart refresh together: the `WindowNavigator`
//! decides which range to show, the `CandleSource` supplies its bars, and the
//! analytics and simulation crates turn them into the series the dashboard
//! draws. Hosts (the CLI and the web server) own the clock and the session;
//! the engine only sees them as inputs.

pub mod error;
pub mod navigator;
pub mod pipeline;

pub use error::EngineError;
pub use navigator::WindowNavigator;
pub use pipeline::{ChartOutput, ChartPipeline, ChartRequest, DisplayOptions, Distribution};
