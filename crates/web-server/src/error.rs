use api_client::error::ApiError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use engine::EngineError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("Broker error: {0}")]
    Broker(#[from] ApiError),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Engine(EngineError::Input(message)) => {
                tracing::warn!(%message, "Rejected chart request.");
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Engine(EngineError::Source(api_err)) | AppError::Broker(api_err) => {
                source_status(api_err)
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

fn source_status(error: ApiError) -> (StatusCode, String) {
    match error {
        ApiError::UnknownInstrument(id) => (
            StatusCode::NOT_FOUND,
            format!("Unknown instrument: {}", id),
        ),
        other => {
            tracing::error!(error = ?other, "Market data source error.");
            (
                StatusCode::BAD_GATEWAY,
                "The market data source is unavailable".to_string(),
            )
        }
    }
}
