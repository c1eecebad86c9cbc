use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Window size {size} is outside the accepted range {min}..={max}")]
    InvalidWindowSize { size: usize, min: usize, max: usize },

    #[error("Invalid parameter '{0}': {1}")]
    InvalidParameter(String, String),

    #[error("Index range {from}..={to} does not fit a series of {len} points")]
    InvalidRange { from: usize, to: usize, len: usize },

    #[error("Error in calculation: {0}")]
    Calculation(#[from] core_types::CoreError),
}
