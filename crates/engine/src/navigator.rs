use crate::error::EngineError;
use chrono::{DateTime, Duration, Utc};
use core_types::{NavCommand, TimeWindow};

/// Moves the viewing window of one instrument along the time axis.
///
/// The navigator holds only the instrument's fixed bounds. The current `end`
/// and the wall clock are passed in on every call, so there is nothing to get
/// out of sync between requests.
#[derive(Debug, Clone, Copy)]
pub struct WindowNavigator {
    anchor_start: DateTime<Utc>,
    step: Duration,
}

impl WindowNavigator {
    pub fn new(anchor_start: DateTime<Utc>, step: Duration) -> Result<Self, EngineError> {
        if step <= Duration::zero() {
            return Err(EngineError::Input(format!(
                "navigation step must be positive, got {}s",
                step.num_seconds()
            )));
        }
        Ok(Self { anchor_start, step })
    }

    pub fn anchor_start(&self) -> DateTime<Utc> {
        self.anchor_start
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// The window shown when an instrument is first opened: ending now.
    pub fn initial(&self, now: DateTime<Utc>) -> Result<TimeWindow, EngineError> {
        self.check_clock(now)?;
        Ok(self.window(now))
    }

    /// Applies `command` to a window currently ending at `current_end`.
    pub fn apply(
        &self,
        command: NavCommand,
        current_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<TimeWindow, EngineError> {
        self.check_clock(now)?;

        let earliest_end = self.anchor_start + self.step;
        let end = match command {
            NavCommand::Refresh | NavCommand::Last => now,
            NavCommand::First => earliest_end,
            NavCommand::Prev => {
                self.check_end(current_end, now)?;
                if current_end - self.step < self.anchor_start {
                    earliest_end
                } else {
                    current_end - self.step
                }
            }
            NavCommand::Next => {
                self.check_end(current_end, now)?;
                if current_end + self.step > now {
                    now
                } else {
                    current_end + self.step
                }
            }
        };

        // An instrument younger than one step has no full window yet.
        let end = end.min(now);
        tracing::debug!(?command, %current_end, %end, "Window moved.");
        Ok(self.window(end))
    }

    fn window(&self, end: DateTime<Utc>) -> TimeWindow {
        TimeWindow {
            anchor_start: self.anchor_start,
            end,
            step: self.step,
        }
    }

    fn check_clock(&self, now: DateTime<Utc>) -> Result<(), EngineError> {
        if now < self.anchor_start {
            return Err(EngineError::Input(format!(
                "current time {} precedes the instrument's first bar {}",
                now, self.anchor_start
            )));
        }
        Ok(())
    }

    fn check_end(&self, end: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), EngineError> {
        if end < self.anchor_start || end > now {
            return Err(EngineError::Input(format!(
                "window end {} is outside [{}, {}]",
                end, self.anchor_start, now
            )));
        }
        Ok(())
    }
}
