use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request to the broker failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The broker API returned HTTP {status} (code {code}): {message}")]
    Broker {
        status: u16,
        code: i32,
        message: String,
    },

    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error("No broker API token is configured")]
    MissingToken,
}

impl From<core_types::CoreError> for ApiError {
    fn from(error: core_types::CoreError) -> Self {
        ApiError::InvalidData(error.to_string())
    }
}
