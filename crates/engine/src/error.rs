use thiserror::Error;

/// Errors that cross the engine boundary.
///
/// Soft conditions (an empty window, no positive vectors, too few bars for the
/// vector window) never surface here; they produce empty or neutral output.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The request was rejected and nothing was computed.
    #[error("Invalid input: {0}")]
    Input(String),

    /// The data source failed; passed through unchanged, never retried here.
    #[error("Data source error: {0}")]
    Source(#[from] api_client::error::ApiError),
}

impl From<core_types::CoreError> for EngineError {
    fn from(error: core_types::CoreError) -> Self {
        EngineError::Input(error.to_string())
    }
}

impl From<analytics::AnalyticsError> for EngineError {
    fn from(error: analytics::AnalyticsError) -> Self {
        EngineError::Input(error.to_string())
    }
}

impl From<backtester::error::BacktestError> for EngineError {
    fn from(error: backtester::error::BacktestError) -> Self {
        EngineError::Input(error.to_string())
    }
}
