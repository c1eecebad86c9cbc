use crate::error::ConfigError;
use core_types::{WindowPreset, MAX_PRECISION};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::ops::RangeInclusive;

/// The accepted range for the trailing vector window, in bars.
pub const WINDOW_SIZE_RANGE: RangeInclusive<usize> = 1..=10;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub analysis: AnalysisParams,
    pub simulation: SimulationParams,
    pub chart: ChartParams,
    pub server: ServerConfig,
}

impl Config {
    /// Checks every section for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;
        self.analysis.validate()?;
        self.simulation.validate()?;
        Ok(())
    }
}

/// Connection settings for the broker's REST gateway.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub sandbox_base_url: String,
    /// Route requests to the sandbox gateway instead of production.
    pub sandbox: bool,
    /// Bearer token. Falls back to the `INVEST_TOKEN` environment variable.
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn endpoint(&self) -> &str {
        if self.sandbox {
            &self.sandbox_base_url
        } else {
            &self.base_url
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "api.timeout_secs",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://invest-public-api.tinkoff.ru/rest".to_string(),
            sandbox_base_url: "https://sandbox-invest-public-api.tinkoff.ru/rest".to_string(),
            sandbox: false,
            token: None,
            timeout_secs: 30,
        }
    }
}

/// Which vector formula the analytics crate should apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum FormulaKind {
    /// Close of the last bar against the open of the first, over the window's high.
    #[default]
    RangeDelta,
    /// Mean of the per-bar close/open deltas in the window.
    MeanDelta,
}

/// Parameters of the vector, statistics and distribution stages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    /// Trailing bars per vector.
    pub window_size: usize,
    /// Percentile of the positive vectors used as the simulation threshold.
    pub percentile: Decimal,
    /// IQR multiplier for the outlier fences.
    pub outlier_k: Decimal,
    /// Fractional digits kept when decoding broker quotations.
    pub precision: u32,
    pub histogram_bins: usize,
    pub formula: FormulaKind,
}

impl AnalysisParams {
    fn validate(&self) -> Result<(), ConfigError> {
        if !WINDOW_SIZE_RANGE.contains(&self.window_size) {
            return Err(ConfigError::Invalid {
                key: "analysis.window_size",
                reason: format!("must be within {:?}, got {}", WINDOW_SIZE_RANGE, self.window_size),
            });
        }
        if self.percentile <= Decimal::ZERO || self.percentile > Decimal::ONE_HUNDRED {
            return Err(ConfigError::Invalid {
                key: "analysis.percentile",
                reason: format!("must be within (0, 100], got {}", self.percentile),
            });
        }
        if self.outlier_k <= Decimal::ZERO {
            return Err(ConfigError::Invalid {
                key: "analysis.outlier_k",
                reason: "must be positive".to_string(),
            });
        }
        if self.precision > MAX_PRECISION {
            return Err(ConfigError::Invalid {
                key: "analysis.precision",
                reason: format!("must not exceed {}", MAX_PRECISION),
            });
        }
        if self.histogram_bins == 0 {
            return Err(ConfigError::Invalid {
                key: "analysis.histogram_bins",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            window_size: 1,
            percentile: dec!(90),
            outlier_k: dec!(1.5),
            precision: 9,
            histogram_bins: 20,
            formula: FormulaKind::default(),
        }
    }
}

/// Contains parameters for the balance simulation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub initial_balance: Decimal,
    /// Fee charged on every position change, as a fraction of the value moved.
    /// 0.0005 corresponds to 0.05%.
    pub fee_rate: Decimal,
    /// An open position is closed once the vector drops below this level.
    pub exit_below: Decimal,
}

impl SimulationParams {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_balance <= Decimal::ZERO {
            return Err(ConfigError::Invalid {
                key: "simulation.initial_balance",
                reason: "must be positive".to_string(),
            });
        }
        if self.fee_rate < Decimal::ZERO || self.fee_rate >= Decimal::ONE {
            return Err(ConfigError::Invalid {
                key: "simulation.fee_rate",
                reason: format!("must be within [0, 1), got {}", self.fee_rate),
            });
        }
        Ok(())
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            initial_balance: dec!(100000),
            fee_rate: dec!(0.0005),
            exit_below: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChartParams {
    pub default_interval: WindowPreset,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".to_string(),
        }
    }
}
