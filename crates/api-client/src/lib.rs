use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use configuration::ApiConfig;
use core_types::{Candle, CandleInterval};
use futures::future::try_join_all;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;

pub mod error;
pub mod responses;

// --- Public API ---
pub use responses::{ApiErrorResponse, ShareInfo};
use responses::{GetCandlesResponse, ShareResponse, SharesResponse};

/// The abstract market-data source the engine pulls from.
///
/// The engine only ever reads through this trait, so the broker client can be
/// swapped for an in-memory source in tests or another broker later.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// The time of the instrument's first-ever bar.
    async fn first_bar_time(&self, instrument_id: &str) -> Result<DateTime<Utc>, ApiError>;

    /// All bars in `[start, end)`, in time order.
    async fn fetch_candles(
        &self,
        instrument_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: CandleInterval,
    ) -> Result<Vec<Candle>, ApiError>;

    /// Instruments that can currently be both bought and sold.
    async fn available_shares(&self) -> Result<Vec<ShareInfo>, ApiError>;
}

/// Splits `[start, end)` into consecutive ranges no longer than `span`.
pub fn request_chunks(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    span: Duration,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut chunks = Vec::new();
    if span <= Duration::zero() {
        return chunks;
    }
    let mut cursor = start;
    while cursor < end {
        let next = std::cmp::min(cursor + span, end);
        chunks.push((cursor, next));
        cursor = next;
    }
    chunks
}

const SERVICE_PREFIX: &str = "tinkoff.public.invest.api.contract.v1";

/// A concrete `CandleSource` backed by the T-Invest REST gateway.
#[derive(Clone)]
pub struct TinkoffClient {
    client: reqwest::Client,
    base_url: String,
    /// Fractional digits kept when decoding quotations.
    precision: u32,
}

impl TinkoffClient {
    pub fn new(api_config: &ApiConfig, precision: u32) -> Result<Self, ApiError> {
        let token = api_config.token.as_deref().ok_or(ApiError::MissingToken)?;

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ApiError::InvalidData(format!("Invalid API token: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(api_config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: api_config.endpoint().trim_end_matches('/').to_string(),
            precision,
        })
    }

    /// Calls one unary gateway method, e.g. `MarketDataService/GetCandles`.
    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}.{}", self.base_url, SERVICE_PREFIX, method);
        tracing::debug!(%url, "Calling broker API.");

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| ApiError::Deserialization(e.to_string()))
        } else {
            let body: ApiErrorResponse = serde_json::from_str(&text).unwrap_or_else(|_| ApiErrorResponse {
                code: 0,
                message: text.clone(),
            });
            Err(ApiError::Broker {
                status: status.as_u16(),
                code: body.code,
                message: body.message,
            })
        }
    }

    async fn get_candles(
        &self,
        instrument_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        interval: CandleInterval,
    ) -> Result<Vec<Candle>, ApiError> {
        let body = json!({
            "figi": instrument_id,
            "instrumentId": instrument_id,
            "from": from.to_rfc3339_opts(SecondsFormat::Secs, true),
            "to": to.to_rfc3339_opts(SecondsFormat::Secs, true),
            "interval": interval.as_api_str(),
        });
        let response: GetCandlesResponse = self.call("MarketDataService/GetCandles", &body).await?;
        response
            .candles
            .into_iter()
            .map(|dto| dto.into_candle(self.precision))
            .collect()
    }
}

#[async_trait]
impl CandleSource for TinkoffClient {
    async fn first_bar_time(&self, instrument_id: &str) -> Result<DateTime<Utc>, ApiError> {
        let body = json!({ "idType": "INSTRUMENT_ID_TYPE_FIGI", "id": instrument_id });
        let response: ShareResponse = match self.call("InstrumentsService/ShareBy", &body).await {
            Err(ApiError::Broker { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                return Err(ApiError::UnknownInstrument(instrument_id.to_string()));
            }
            other => other?,
        };
        response.instrument.first_1min_candle_date.ok_or_else(|| {
            ApiError::InvalidData(format!("{} has no first candle date", instrument_id))
        })
    }

    async fn fetch_candles(
        &self,
        instrument_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: CandleInterval,
    ) -> Result<Vec<Candle>, ApiError> {
        let chunks = request_chunks(start, end, interval.max_request_span());
        tracing::debug!(instrument_id, chunks = chunks.len(), ?interval, "Fetching candles.");

        let batches = try_join_all(
            chunks
                .into_iter()
                .map(|(from, to)| self.get_candles(instrument_id, from, to, interval)),
        )
        .await?;

        // Chunk edges may both report the boundary bar.
        let mut candles: Vec<Candle> = batches.into_iter().flatten().collect();
        candles.sort_by_key(|c| c.timestamp);
        candles.dedup_by_key(|c| c.timestamp);
        Ok(candles)
    }

    async fn available_shares(&self) -> Result<Vec<ShareInfo>, ApiError> {
        let body = json!({ "instrumentStatus": "INSTRUMENT_STATUS_BASE" });
        let response: SharesResponse = self.call("InstrumentsService/Shares", &body).await?;
        Ok(response
            .instruments
            .into_iter()
            .filter(|s| s.buy_available_flag && s.sell_available_flag)
            .map(ShareInfo::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn chunks_cover_range_without_gaps() {
        let chunks = request_chunks(at(0), at(10), Duration::hours(4));
        assert_eq!(chunks, vec![(at(0), at(4)), (at(4), at(8)), (at(8), at(10))]);
    }

    #[test]
    fn empty_or_inverted_range_has_no_chunks() {
        assert!(request_chunks(at(5), at(5), Duration::hours(1)).is_empty());
        assert!(request_chunks(at(6), at(5), Duration::hours(1)).is_empty());
        assert!(request_chunks(at(0), at(5), Duration::zero()).is_empty());
    }

    #[test]
    fn client_requires_a_token() {
        let config = ApiConfig::default();
        assert!(matches!(TinkoffClient::new(&config, 2), Err(ApiError::MissingToken)));
    }

    #[test]
    fn client_builds_with_token() {
        let config = ApiConfig {
            token: Some("t.secret".to_string()),
            sandbox: true,
            ..ApiConfig::default()
        };
        let client = TinkoffClient::new(&config, 2).unwrap();
        assert!(client.base_url.starts_with("https://sandbox-"));
    }
}
