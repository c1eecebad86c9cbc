//! End-to-end runs of the chart pipeline against an in-memory candle source.

use api_client::error::ApiError;
use api_client::{CandleSource, ShareInfo};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use configuration::{AnalysisParams, SimulationParams};
use core_types::{Candle, CandleInterval, NavCommand, WindowPreset};
use engine::{ChartPipeline, ChartRequest, EngineError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const FIGI: &str = "BBG000TEST01";

// ── Helpers ──────────────────────────────────────────────────────────

fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 10, 0, 0, 0).unwrap()
}

/// Hourly bars from `from`, each rising by one unit from its open.
fn rising_bars(from: DateTime<Utc>, count: i64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let open = dec!(100) + Decimal::from(i);
            Candle {
                timestamp: from + Duration::hours(i),
                open,
                close: open + dec!(1),
                high: open + dec!(2),
                low: open - dec!(1),
            }
        })
        .collect()
}

struct InMemorySource {
    anchor: DateTime<Utc>,
    candles: Vec<Candle>,
    calls: AtomicUsize,
}

impl InMemorySource {
    fn new(candles: Vec<Candle>) -> Self {
        Self {
            anchor: anchor(),
            candles,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CandleSource for InMemorySource {
    async fn first_bar_time(&self, instrument_id: &str) -> Result<DateTime<Utc>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if instrument_id != FIGI {
            return Err(ApiError::UnknownInstrument(instrument_id.to_string()));
        }
        Ok(self.anchor)
    }

    async fn fetch_candles(
        &self,
        _instrument_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        _interval: CandleInterval,
    ) -> Result<Vec<Candle>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .candles
            .iter()
            .filter(|c| c.timestamp >= start && c.timestamp < end)
            .cloned()
            .collect())
    }

    async fn available_shares(&self) -> Result<Vec<ShareInfo>, ApiError> {
        Ok(Vec::new())
    }
}

fn pipeline(source: Arc<InMemorySource>) -> ChartPipeline {
    ChartPipeline::new(source, AnalysisParams::default(), SimulationParams::default())
}

fn day_request() -> ChartRequest {
    ChartRequest::new(FIGI, WindowPreset::Day)
}

// ── Tests ────────────────────────────────────────────────────────────

#[tokio::test]
async fn opening_an_instrument_shows_the_latest_window() {
    let source = Arc::new(InMemorySource::new(rising_bars(now() - Duration::hours(12), 12)));
    let mut request = day_request();
    request.sequence = Some(7);

    let output = pipeline(source).run(&request, now()).await.unwrap();

    assert_eq!(output.sequence, Some(7));
    assert_eq!(output.window.end, now());
    assert_eq!(output.window.start(), now() - Duration::days(1));
    assert!(output.navigation.can_go_prev);
    assert!(!output.navigation.can_go_next && !output.navigation.can_go_last);

    assert_eq!(output.points.len(), 12);
    assert!(output.threshold.is_some());
    assert_eq!(output.balances.len(), 12);
    for (balance, point) in output.balances.iter().zip(&output.points) {
        assert_eq!(balance.timestamp, point.timestamp);
    }

    let range = output.price_range.unwrap();
    assert_eq!(range.min, dec!(100));
    assert_eq!(range.max, dec!(111));

    let delta = output.price_delta.unwrap();
    assert_eq!(delta.start_price, dec!(100));
    assert_eq!(delta.end_price, dec!(111));
}

#[tokio::test]
async fn empty_window_is_not_an_error() {
    let source = Arc::new(InMemorySource::new(Vec::new()));
    let output = pipeline(source).run(&day_request(), now()).await.unwrap();

    assert!(output.points.is_empty());
    assert!(output.balances.is_empty());
    assert!(output.threshold.is_none());
    assert!(output.distribution.values.is_empty());
    assert!(output.distribution.histogram.is_empty());
    assert!(output.price_range.is_none());
    assert!(output.price_delta.is_none());
}

#[tokio::test]
async fn prev_moves_the_window_back_one_step() {
    let bars = rising_bars(now() - Duration::days(2), 48);
    let source = Arc::new(InMemorySource::new(bars));
    let mut request = day_request();
    request.command = Some(NavCommand::Prev);
    request.current_end = Some(now());

    let output = pipeline(source).run(&request, now()).await.unwrap();

    assert_eq!(output.window.end, now() - Duration::days(1));
    assert!(output.navigation.can_go_next && output.navigation.can_go_last);
    assert_eq!(output.points.len(), 24);
    assert!(output.points.iter().all(|p| p.timestamp < output.window.end));
}

#[tokio::test]
async fn invalid_window_size_is_rejected_before_any_fetch() {
    let source = Arc::new(InMemorySource::new(rising_bars(now() - Duration::hours(3), 3)));
    let mut request = day_request();
    request.window_size = Some(0);

    let result = pipeline(source.clone()).run(&request, now()).await;

    assert!(matches!(result, Err(EngineError::Input(_))));
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_instrument_surfaces_as_source_error() {
    let source = Arc::new(InMemorySource::new(Vec::new()));
    let request = ChartRequest::new("NOPE", WindowPreset::Week);

    let result = pipeline(source).run(&request, now()).await;

    assert!(matches!(
        result,
        Err(EngineError::Source(ApiError::UnknownInstrument(id))) if id == "NOPE"
    ));
}

#[tokio::test]
async fn slider_selection_outside_the_series_is_rejected() {
    let source = Arc::new(InMemorySource::new(rising_bars(now() - Duration::hours(4), 4)));
    let mut request = day_request();
    request.selection = Some((1, 9));

    let result = pipeline(source).run(&request, now()).await;
    assert!(matches!(result, Err(EngineError::Input(_))));
}

#[tokio::test]
async fn navigation_resets_a_stale_slider_selection() {
    let source = Arc::new(InMemorySource::new(rising_bars(now() - Duration::days(2), 30)));
    let mut request = day_request();
    request.command = Some(NavCommand::Last);
    request.current_end = Some(now() - Duration::days(1));
    request.selection = Some((5, 40));

    let output = pipeline(source).run(&request, now()).await.unwrap();

    // Only the 6 bars of the last day fall in the new window.
    assert_eq!(output.points.len(), 6);
    let delta = output.price_delta.unwrap();
    assert_eq!(delta.start_price, output.points[0].price);
    assert_eq!(delta.end_price, output.points[5].price);
}

#[tokio::test]
async fn wider_vector_window_leaves_an_undefined_prefix() {
    let source = Arc::new(InMemorySource::new(rising_bars(now() - Duration::hours(10), 10)));
    let mut request = day_request();
    request.window_size = Some(4);

    let output = pipeline(source).run(&request, now()).await.unwrap();

    assert!(output.points[..3].iter().all(|p| p.vector.is_none()));
    assert!(output.points[3..].iter().all(|p| p.vector.is_some()));
    assert_eq!(output.balances.len(), 7);
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let source = Arc::new(InMemorySource::new(rising_bars(now() - Duration::hours(20), 20)));
    let pipeline = pipeline(source);
    let first = pipeline.run(&day_request(), now()).await.unwrap();
    let second = pipeline.run(&day_request(), now()).await.unwrap();
    assert_eq!(first, second);
}
