use crate::error::ConfigError;
use std::path::Path;
use tracing_subscriber::EnvFilter;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AnalysisParams, ApiConfig, ChartParams, Config, FormulaKind, ServerConfig, SimulationParams,
    WINDOW_SIZE_RANGE,
};

/// Environment variable prefix for overrides, e.g. `CANDLESCOPE__SIMULATION__FEE_RATE`.
const ENV_PREFIX: &str = "CANDLESCOPE";

/// The variable the broker token is read from when the config does not set one.
const TOKEN_ENV_VAR: &str = "INVEST_TOKEN";

/// Loads the application configuration.
///
/// Sources, later ones winning: built-in defaults, the TOML file at `path`
/// (skipped when absent), then `CANDLESCOPE__*` environment variables. The
/// broker token falls back to `INVEST_TOKEN`, which may come from a `.env` file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();

    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config = builder.try_deserialize::<Config>()?;

    if config.api.token.is_none() {
        config.api.token = std::env::var(TOKEN_ENV_VAR).ok();
    }

    config.validate()?;
    tracing::debug!(path = %path.display(), sandbox = config.api.sandbox, "Configuration loaded.");

    Ok(config)
}

/// Installs the global `tracing` subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("A global tracing subscriber was already installed.");
    }
}
