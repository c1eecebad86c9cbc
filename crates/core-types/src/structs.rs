use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One decoded OHLC bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub close: Decimal,
    pub high: Decimal,
    pub low: Decimal,
}

/// A bar's price together with its derived vector. `vector` is `None` while the
/// trailing window is not yet full or when the formula is undefined for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorPoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    pub vector: Option<Decimal>,
}

/// The simulated balance after the point with the same timestamp was processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceState {
    pub timestamp: DateTime<Utc>,
    pub balance: Decimal,
}

/// Which toolbar buttons are usable for the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub can_go_first: bool,
    pub can_go_prev: bool,
    pub can_go_next: bool,
    pub can_go_last: bool,
}

/// The viewing window `[end - step, end)` of one instrument.
///
/// `anchor_start` is the instrument's first bar and never changes; `end` moves
/// with navigation and stays within `[anchor_start, now]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub anchor_start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(with = "duration_secs")]
    pub step: Duration,
}

impl TimeWindow {
    /// The start of the fetch range.
    pub fn start(&self) -> DateTime<Utc> {
        self.end - self.step
    }

    /// Derives the button states. `now` must be the same instant the window was
    /// computed against.
    pub fn navigation(&self, now: DateTime<Utc>) -> NavigationState {
        let at_beginning = self.end - self.step <= self.anchor_start;
        let at_end = self.end >= now;
        NavigationState {
            can_go_first: !at_beginning,
            can_go_prev: !at_beginning,
            can_go_next: !at_end,
            can_go_last: !at_end,
        }
    }
}

mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = i64::deserialize(deserializer)?;
        Duration::try_seconds(secs)
            .ok_or_else(|| serde::de::Error::custom(format!("{} seconds is out of range", secs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn window_start_is_one_step_before_end() {
        let window = TimeWindow { anchor_start: day(1), end: day(10), step: Duration::days(1) };
        assert_eq!(window.start(), day(9));
    }

    #[test]
    fn flags_at_both_boundaries() {
        let window = TimeWindow { anchor_start: day(1), end: day(2), step: Duration::days(1) };
        let nav = window.navigation(day(2));
        assert!(!nav.can_go_first && !nav.can_go_prev);
        assert!(!nav.can_go_next && !nav.can_go_last);
    }

    #[test]
    fn serializes_step_as_seconds() {
        let window = TimeWindow { anchor_start: day(1), end: day(3), step: Duration::days(1) };
        let json = serde_json::to_value(window).unwrap();
        assert_eq!(json["step"], 86_400);
        let back: TimeWindow = serde_json::from_value(json).unwrap();
        assert_eq!(back, window);
    }
}
