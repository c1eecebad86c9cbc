use crate::error::EngineError;
use crate::navigator::WindowNavigator;
use analytics::{
    defined_vectors, histogram, positive_threshold, HistogramBin, OutlierFilter, PriceDelta,
    PriceRange, VectorSeriesBuilder,
};
use api_client::CandleSource;
use backtester::BalanceSimulator;
use chrono::{DateTime, Utc};
use configuration::{AnalysisParams, SimulationParams, WINDOW_SIZE_RANGE};
use core_types::{BalanceState, NavCommand, NavigationState, TimeWindow, VectorPoint, WindowPreset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Distribution chart toggles. They live in the caller's session; the engine
/// only applies `filter_outliers` and echoes the rest back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    pub show_hist: bool,
    pub show_curve: bool,
    pub show_rug: bool,
    pub filter_outliers: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_hist: true,
            show_curve: true,
            show_rug: false,
            filter_outliers: true,
        }
    }
}

/// Everything one chart refresh needs from the caller's session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub instrument_id: String,
    pub preset: WindowPreset,
    /// `None` opens the instrument fresh, with the window ending now.
    pub command: Option<NavCommand>,
    /// End of the window currently on screen; needed by `prev` and `next`.
    pub current_end: Option<DateTime<Utc>>,
    /// Overrides the configured vector window.
    pub window_size: Option<usize>,
    pub display: DisplayOptions,
    /// Range-slider selection `(from, to)` as point indices. Defaults to the
    /// whole series. Ignored when `command` is set: a moved window resets the
    /// slider to its full range.
    pub selection: Option<(usize, usize)>,
    /// Echoed back so callers can drop results of superseded requests.
    pub sequence: Option<u64>,
}

impl ChartRequest {
    pub fn new(instrument_id: impl Into<String>, preset: WindowPreset) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            preset,
            command: None,
            current_end: None,
            window_size: None,
            display: DisplayOptions::default(),
            selection: None,
            sequence: None,
        }
    }
}

/// The vector values prepared for the distribution chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub values: Vec<Decimal>,
    pub histogram: Vec<HistogramBin>,
    pub display: DisplayOptions,
}

/// Everything the renderer needs after one refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOutput {
    pub sequence: Option<u64>,
    pub instrument_id: String,
    pub preset: WindowPreset,
    pub window: TimeWindow,
    pub navigation: NavigationState,
    pub points: Vec<VectorPoint>,
    pub balances: Vec<BalanceState>,
    pub threshold: Option<Decimal>,
    pub distribution: Distribution,
    pub price_range: Option<PriceRange>,
    pub price_delta: Option<PriceDelta>,
}

/// One pass of navigate → fetch → vectors → balance → distribution.
///
/// The pipeline keeps no state between runs; concurrent runs for different
/// sessions share nothing mutable.
pub struct ChartPipeline {
    source: Arc<dyn CandleSource>,
    analysis: AnalysisParams,
    simulation: SimulationParams,
    builder: VectorSeriesBuilder,
    simulator: BalanceSimulator,
    outliers: OutlierFilter,
}

impl ChartPipeline {
    pub fn new(
        source: Arc<dyn CandleSource>,
        analysis: AnalysisParams,
        simulation: SimulationParams,
    ) -> Self {
        Self {
            builder: VectorSeriesBuilder::from_kind(analysis.formula),
            simulator: BalanceSimulator::from_params(&simulation),
            outliers: OutlierFilter::new(analysis.outlier_k),
            source,
            analysis,
            simulation,
        }
    }

    pub fn source(&self) -> &Arc<dyn CandleSource> {
        &self.source
    }

    /// Runs the whole pipeline for `request` against the wall-clock instant `now`.
    pub async fn run(
        &self,
        request: &ChartRequest,
        now: DateTime<Utc>,
    ) -> Result<ChartOutput, EngineError> {
        // Validate before any network traffic.
        let window_size = request.window_size.unwrap_or(self.analysis.window_size);
        if !WINDOW_SIZE_RANGE.contains(&window_size) {
            return Err(EngineError::Input(format!(
                "window size must be within {:?}, got {}",
                WINDOW_SIZE_RANGE, window_size
            )));
        }

        // 1. Navigate
        let anchor_start = self.source.first_bar_time(&request.instrument_id).await?;
        let navigator = WindowNavigator::new(anchor_start, request.preset.step())?;
        let window = match request.command {
            None => navigator.initial(now)?,
            Some(command) => {
                navigator.apply(command, request.current_end.unwrap_or(now), now)?
            }
        };

        // 2. Fetch
        let candles = self
            .source
            .fetch_candles(
                &request.instrument_id,
                window.start(),
                window.end,
                request.preset.candle_interval(),
            )
            .await?;
        if candles.is_empty() {
            tracing::warn!(
                instrument = %request.instrument_id,
                start = %window.start(),
                end = %window.end,
                "No bars in window."
            );
        }

        // 3. Vectors
        let points = self.builder.build(&candles, window_size)?;

        // 4. Balance
        let threshold = positive_threshold(&points, self.analysis.percentile)?;
        let balances = self.simulator.simulate(
            &points,
            threshold,
            self.simulation.initial_balance,
            self.simulation.fee_rate,
        )?;

        // 5. Distribution
        let vectors = defined_vectors(&points);
        let values = if request.display.filter_outliers {
            self.outliers.filter(&vectors)
        } else {
            vectors
        };
        let distribution = Distribution {
            histogram: histogram(&values, self.analysis.histogram_bins),
            values,
            display: request.display,
        };

        // 6. Slider summary
        let selection = request.selection.filter(|_| request.command.is_none());
        let price_delta = match (selection, points.len()) {
            (Some((from, to)), _) => Some(PriceDelta::between(&points, from, to)?),
            (None, 0) => None,
            (None, len) => Some(PriceDelta::between(&points, 0, len - 1)?),
        };

        tracing::info!(
            instrument = %request.instrument_id,
            preset = %request.preset,
            bars = candles.len(),
            balances = balances.len(),
            "Chart computed."
        );

        Ok(ChartOutput {
            sequence: request.sequence,
            instrument_id: request.instrument_id.clone(),
            preset: request.preset,
            navigation: window.navigation(now),
            window,
            price_range: PriceRange::of(&points),
            points,
            balances,
            threshold,
            distribution,
            price_delta,
        })
    }
}
