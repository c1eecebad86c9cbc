use api_client::{CandleSource, TinkoffClient};
use axum::{routing::get, Router};
use configuration::Config;
use core_types::WindowPreset;
use engine::ChartPipeline;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

use error::AppError;

/// The shared application state that all handlers can access.
///
/// Nothing here is per-session: the browser keeps its own window position and
/// toggles and sends them with every chart request.
pub struct AppState {
    pub pipeline: ChartPipeline,
    pub default_interval: WindowPreset,
}

impl AppState {
    pub fn new(source: Arc<dyn CandleSource>, config: &Config) -> Self {
        Self {
            pipeline: ChartPipeline::new(
                source,
                config.analysis.clone(),
                config.simulation.clone(),
            ),
            default_interval: config.chart.default_interval,
        }
    }

    /// Builds the state around the live broker client.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = TinkoffClient::new(&config.api, config.analysis.precision)?;
        Ok(Self::new(Arc::new(client), config))
    }
}

/// Defines the application routes.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/shares", get(handlers::get_shares))
        .route("/api/intervals", get(handlers::get_intervals))
        .route("/api/chart", get(handlers::get_chart))
        .with_state(Arc::new(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// The main function to run the web server. Tracing must already be initialized.
pub async fn run_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);

    tracing::info!("Web server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
