use crate::error::ApiError;
use chrono::{DateTime, Utc};
use core_types::{Candle, Quotation};
use serde::{Deserialize, Deserializer, Serialize};

// The gateway speaks proto3 JSON: camelCase names, int64 values as strings and
// zero-valued fields omitted entirely, hence the defaults below.

/// A price as it appears on the wire.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationDto {
    #[serde(default, deserialize_with = "int64_from_json")]
    pub units: i64,
    #[serde(default)]
    pub nano: i32,
}

impl TryFrom<QuotationDto> for Quotation {
    type Error = ApiError;

    fn try_from(dto: QuotationDto) -> Result<Self, Self::Error> {
        Ok(Quotation::new(dto.units, dto.nano)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricCandleDto {
    #[serde(default)]
    pub open: QuotationDto,
    #[serde(default)]
    pub high: QuotationDto,
    #[serde(default)]
    pub low: QuotationDto,
    #[serde(default)]
    pub close: QuotationDto,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub is_complete: bool,
}

impl HistoricCandleDto {
    /// Decodes every price to `precision` digits.
    pub fn into_candle(self, precision: u32) -> Result<Candle, ApiError> {
        let decode = |q: QuotationDto| -> Result<_, ApiError> {
            Ok(Quotation::try_from(q)?.to_decimal(precision)?)
        };
        Ok(Candle {
            timestamp: self.time,
            open: decode(self.open)?,
            close: decode(self.close)?,
            high: decode(self.high)?,
            low: decode(self.low)?,
        })
    }
}

/// Response of `MarketDataService/GetCandles`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetCandlesResponse {
    #[serde(default)]
    pub candles: Vec<HistoricCandleDto>,
}

/// The subset of a share's description the dashboard uses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareDto {
    pub figi: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "first1minCandleDate", default)]
    pub first_1min_candle_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub buy_available_flag: bool,
    #[serde(default)]
    pub sell_available_flag: bool,
}

/// Response of `InstrumentsService/ShareBy`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShareResponse {
    pub instrument: ShareDto,
}

/// Response of `InstrumentsService/Shares`.
#[derive(Debug, Clone, Deserialize)]
pub struct SharesResponse {
    #[serde(default)]
    pub instruments: Vec<ShareDto>,
}

/// Represents an error body returned by the gateway.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// A share that can be both bought and sold, as offered in the instrument picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareInfo {
    pub figi: String,
    pub ticker: String,
    pub name: String,
    pub first_bar_time: Option<DateTime<Utc>>,
}

impl ShareInfo {
    /// `"Name (TICKER)"`, the picker label.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.ticker)
    }
}

impl From<ShareDto> for ShareInfo {
    fn from(dto: ShareDto) -> Self {
        Self {
            figi: dto.figi,
            ticker: dto.ticker,
            name: dto.name,
            first_bar_time: dto.first_1min_candle_date,
        }
    }
}

fn int64_from_json<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
