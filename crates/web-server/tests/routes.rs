use api_client::error::ApiError;
use api_client::{CandleSource, ShareInfo};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Duration, TimeZone, Utc};
use configuration::Config;
use core_types::{Candle, CandleInterval};
use rust_decimal_macros::dec;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use web_server::{build_router, AppState};

struct StubSource;

#[async_trait]
impl CandleSource for StubSource {
    async fn first_bar_time(&self, instrument_id: &str) -> Result<DateTime<Utc>, ApiError> {
        match instrument_id {
            "SBER" => Ok(Utc.with_ymd_and_hms(2018, 3, 7, 18, 33, 0).unwrap()),
            "DOWN" => Err(ApiError::Broker {
                status: 503,
                code: 0,
                message: "maintenance".to_string(),
            }),
            other => Err(ApiError::UnknownInstrument(other.to_string())),
        }
    }

    async fn fetch_candles(
        &self,
        _instrument_id: &str,
        _start: DateTime<Utc>,
        end: DateTime<Utc>,
        _interval: CandleInterval,
    ) -> Result<Vec<Candle>, ApiError> {
        Ok((1..=3)
            .map(|i| Candle {
                timestamp: end - Duration::hours(4 - i),
                open: dec!(250) + rust_decimal::Decimal::from(i),
                close: dec!(252) + rust_decimal::Decimal::from(i),
                high: dec!(253) + rust_decimal::Decimal::from(i),
                low: dec!(249),
            })
            .collect())
    }

    async fn available_shares(&self) -> Result<Vec<ShareInfo>, ApiError> {
        Ok(vec![
            ShareInfo {
                figi: "SBER".to_string(),
                ticker: "SBER".to_string(),
                name: "Sberbank".to_string(),
                first_bar_time: None,
            },
            ShareInfo {
                figi: "GAZP".to_string(),
                ticker: "GAZP".to_string(),
                name: "Gazprom".to_string(),
                first_bar_time: None,
            },
        ])
    }
}

fn app() -> axum::Router {
    build_router(AppState::new(Arc::new(StubSource), &Config::default()))
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn shares_are_offered_as_select_options() {
    let (status, body) = get("/api/shares").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["options"][0]["value"], "SBER");
    assert_eq!(body["options"][0]["label"], "Sberbank (SBER)");
    assert_eq!(body["default_instrument"], "SBER");
    assert_eq!(body["default_interval"], "1m");
}

#[tokio::test]
async fn intervals_list_every_preset() {
    let (status, body) = get("/api/intervals").await;
    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|option| option["value"].as_str().unwrap())
        .collect();
    assert_eq!(codes, ["1d", "1w", "1m", "6m", "1y"]);
}

#[tokio::test]
async fn chart_echoes_sequence_and_summarises_delta() {
    let (status, body) = get("/api/chart?instrument=SBER&interval=1d&command=refresh&sequence=42").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sequence"], 42);
    assert_eq!(body["points"].as_array().unwrap().len(), 3);
    assert_eq!(body["navigation"]["can_go_next"], false);
    assert!(body["delta_text"].as_str().unwrap().starts_with('+'));
}

#[tokio::test]
async fn bad_input_is_a_client_error() {
    let (status, body) = get("/api/chart?instrument=SBER&window_size=11").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("window size"));

    let (status, _) = get("/api/chart?instrument=SBER&from_index=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn source_failures_map_to_gateway_statuses() {
    let (status, _) = get("/api/chart?instrument=NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get("/api/chart?instrument=DOWN").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
