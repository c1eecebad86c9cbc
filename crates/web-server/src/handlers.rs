use crate::{error::AppError, AppState};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use core_types::{NavCommand, WindowPreset};
use engine::{ChartOutput, ChartRequest, DisplayOptions, EngineError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Currency sign used in the slider summary.
const PRICE_UNIT: &str = "₽";

/// One entry of a dropdown.
#[derive(Debug, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct SharesResponse {
    pub options: Vec<SelectOption>,
    /// The instrument and interval selected when the dashboard opens.
    pub default_instrument: Option<String>,
    pub default_interval: WindowPreset,
}

/// # GET /api/shares
/// Lists the shares that can currently be both bought and sold.
pub async fn get_shares(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SharesResponse>, AppError> {
    let shares = state.pipeline.source().available_shares().await?;
    let options: Vec<SelectOption> = shares
        .iter()
        .map(|share| SelectOption {
            value: share.figi.clone(),
            label: share.label(),
        })
        .collect();

    Ok(Json(SharesResponse {
        default_instrument: options.first().map(|option| option.value.clone()),
        default_interval: state.default_interval,
        options,
    }))
}

/// # GET /api/intervals
pub async fn get_intervals() -> Json<Vec<SelectOption>> {
    Json(
        WindowPreset::ALL
            .iter()
            .map(|preset| SelectOption {
                value: preset.code().to_string(),
                label: preset.label().to_string(),
            })
            .collect(),
    )
}

fn default_true() -> bool {
    true
}

/// Query string of `/api/chart`. Toggles default to the dashboard's initial state.
#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub instrument: String,
    #[serde(default)]
    pub interval: Option<WindowPreset>,
    pub command: Option<NavCommand>,
    /// End of the window the browser is currently showing.
    pub end: Option<DateTime<Utc>>,
    pub window_size: Option<usize>,
    #[serde(default = "default_true")]
    pub show_hist: bool,
    #[serde(default = "default_true")]
    pub show_curve: bool,
    #[serde(default)]
    pub show_rug: bool,
    #[serde(default = "default_true")]
    pub filter_outliers: bool,
    pub from_index: Option<usize>,
    pub to_index: Option<usize>,
    pub sequence: Option<u64>,
}

impl ChartQuery {
    fn into_request(self, default_interval: WindowPreset) -> Result<ChartRequest, EngineError> {
        let selection = match (self.from_index, self.to_index) {
            (Some(from), Some(to)) => Some((from, to)),
            (None, None) => None,
            _ => {
                return Err(EngineError::Input(
                    "from_index and to_index must be given together".to_string(),
                ));
            }
        };

        Ok(ChartRequest {
            instrument_id: self.instrument,
            preset: self.interval.unwrap_or(default_interval),
            command: self.command,
            current_end: self.end,
            window_size: self.window_size,
            display: DisplayOptions {
                show_hist: self.show_hist,
                show_curve: self.show_curve,
                show_rug: self.show_rug,
                filter_outliers: self.filter_outliers,
            },
            selection,
            sequence: self.sequence,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ChartResponse {
    #[serde(flatten)]
    pub output: ChartOutput,
    /// The slider summary as shown above the price chart, e.g. `+1.5₽ | 3.20%`.
    pub delta_text: Option<String>,
}

/// # GET /api/chart
/// Runs one pipeline pass for the browser's current session state.
pub async fn get_chart(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartResponse>, AppError> {
    let request = query.into_request(state.default_interval)?;
    let output = state.pipeline.run(&request, Utc::now()).await?;
    let delta_text = output
        .price_delta
        .as_ref()
        .map(|delta| delta.summary(PRICE_UNIT));
    Ok(Json(ChartResponse { output, delta_text }))
}
