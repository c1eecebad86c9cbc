use crate::error::CoreError;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A navigation button press on the chart toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavCommand {
    First,
    Prev,
    Refresh,
    Next,
    Last,
}

impl NavCommand {
    pub const ALL: [NavCommand; 5] = [
        NavCommand::First,
        NavCommand::Prev,
        NavCommand::Refresh,
        NavCommand::Next,
        NavCommand::Last,
    ];
}

impl FromStr for NavCommand {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(NavCommand::First),
            "prev" => Ok(NavCommand::Prev),
            "refresh" => Ok(NavCommand::Refresh),
            "next" => Ok(NavCommand::Next),
            "last" => Ok(NavCommand::Last),
            other => Err(CoreError::InvalidInput(
                "command".to_string(),
                format!("unknown navigation command '{}'", other),
            )),
        }
    }
}

/// Bar granularity understood by the broker's candle endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandleInterval {
    OneMinute,
    FiveMinutes,
    ThirtyMinutes,
    TwoHours,
    FourHours,
}

impl CandleInterval {
    /// The enum name used on the wire by the broker API.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            CandleInterval::OneMinute => "CANDLE_INTERVAL_1_MIN",
            CandleInterval::FiveMinutes => "CANDLE_INTERVAL_5_MIN",
            CandleInterval::ThirtyMinutes => "CANDLE_INTERVAL_30_MIN",
            CandleInterval::TwoHours => "CANDLE_INTERVAL_2_HOUR",
            CandleInterval::FourHours => "CANDLE_INTERVAL_4_HOUR",
        }
    }

    /// The longest `[from, to)` range a single candle request may cover.
    pub fn max_request_span(&self) -> Duration {
        match self {
            CandleInterval::OneMinute | CandleInterval::FiveMinutes => Duration::days(1),
            CandleInterval::ThirtyMinutes => Duration::days(2),
            CandleInterval::TwoHours | CandleInterval::FourHours => Duration::days(30),
        }
    }
}

/// A selectable window size. Each preset fixes both the navigation step and the
/// bar granularity used to fill the window, so coarser windows get coarser bars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowPreset {
    #[serde(rename = "1d")]
    Day,
    #[serde(rename = "1w")]
    Week,
    #[default]
    #[serde(rename = "1m")]
    Month,
    #[serde(rename = "6m")]
    HalfYear,
    #[serde(rename = "1y")]
    Year,
}

impl WindowPreset {
    pub const ALL: [WindowPreset; 5] = [
        WindowPreset::Day,
        WindowPreset::Week,
        WindowPreset::Month,
        WindowPreset::HalfYear,
        WindowPreset::Year,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            WindowPreset::Day => "1d",
            WindowPreset::Week => "1w",
            WindowPreset::Month => "1m",
            WindowPreset::HalfYear => "6m",
            WindowPreset::Year => "1y",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WindowPreset::Day => "Day",
            WindowPreset::Week => "Week",
            WindowPreset::Month => "Month",
            WindowPreset::HalfYear => "6 months",
            WindowPreset::Year => "Year",
        }
    }

    /// Fixed-length navigation step. Months and years are approximated by whole
    /// days so that `prev` undoes `next` exactly.
    pub fn step(&self) -> Duration {
        match self {
            WindowPreset::Day => Duration::days(1),
            WindowPreset::Week => Duration::days(7),
            WindowPreset::Month => Duration::days(30),
            WindowPreset::HalfYear => Duration::days(182),
            WindowPreset::Year => Duration::days(365),
        }
    }

    pub fn candle_interval(&self) -> CandleInterval {
        match self {
            WindowPreset::Day => CandleInterval::OneMinute,
            WindowPreset::Week => CandleInterval::FiveMinutes,
            WindowPreset::Month => CandleInterval::ThirtyMinutes,
            WindowPreset::HalfYear => CandleInterval::TwoHours,
            WindowPreset::Year => CandleInterval::FourHours,
        }
    }
}

impl fmt::Display for WindowPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for WindowPreset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WindowPreset::ALL
            .into_iter()
            .find(|preset| preset.code() == s)
            .ok_or_else(|| {
                CoreError::InvalidInput(
                    "interval".to_string(),
                    format!("unknown window preset '{}'", s),
                )
            })
    }
}
