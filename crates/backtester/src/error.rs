use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Simulation received invalid parameters: {0}")]
    InvalidParameters(String),
}
