//! Writing activity and the session timer

use serde::{Deserialize, Serialize};
use std::fmt;

/// Remembers when the writer last touched the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityTracker {
    last_activity: Option<u64>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, now: u64) {
        self.last_activity = Some(now);
    }

    pub fn last_activity(&self) -> Option<u64> {
        self.last_activity
    }

    /// Milliseconds since the last recorded activity
    pub fn idle_for(&self, now: u64) -> Option<u64> {
        self.last_activity.map(|at| now.saturating_sub(at))
    }

    /// True once strictly more than `threshold_ms` has passed; false until
    /// something has been recorded
    pub fn is_inactive(&self, now: u64, threshold_ms: u64) -> bool {
        self.idle_for(now).is_some_and(|idle| idle > threshold_ms)
    }
}

/// Whole seconds of writing time, displayed as `HH:MM:SS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Elapsed {
    pub seconds: u64,
}

impl Elapsed {
    pub fn from_millis(millis: u64) -> Self {
        Self {
            seconds: millis / 1000,
        }
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.seconds / 3600;
        let minutes = (self.seconds % 3600) / 60;
        let seconds = self.seconds % 60;
        write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Start/pause stopwatch for a writing session
///
/// Time is banked on every pause, so the elapsed total survives any number
/// of start/pause cycles until [`WritingTimer::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritingTimer {
    running_since: Option<u64>,
    banked_ms: u64,
    auto_pause: bool,
}

impl Default for WritingTimer {
    fn default() -> Self {
        Self {
            running_since: None,
            banked_ms: 0,
            auto_pause: true,
        }
    }
}

impl WritingTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Returns false if the timer was already running
    pub fn start(&mut self, now: u64) -> bool {
        if self.is_running() {
            return false;
        }
        self.running_since = Some(now);
        true
    }

    /// Returns false if the timer was not running
    pub fn pause(&mut self, now: u64) -> bool {
        let Some(since) = self.running_since.take() else {
            return false;
        };
        self.banked_ms += now.saturating_sub(since);
        true
    }

    /// Stops the timer and zeroes it
    pub fn reset(&mut self) {
        self.running_since = None;
        self.banked_ms = 0;
    }

    pub fn elapsed_ms(&self, now: u64) -> u64 {
        let running = self.running_since.map_or(0, |since| now.saturating_sub(since));
        self.banked_ms + running
    }

    pub fn elapsed(&self, now: u64) -> Elapsed {
        Elapsed::from_millis(self.elapsed_ms(now))
    }

    pub fn auto_pause(&self) -> bool {
        self.auto_pause
    }

    pub fn set_auto_pause(&mut self, enabled: bool) {
        self.auto_pause = enabled;
    }

    /// Pauses a running timer once the writer has gone quiet
    ///
    /// Returns true if this call paused it.
    pub fn check_inactivity(
        &mut self,
        activity: &ActivityTracker,
        now: u64,
        threshold_ms: u64,
    ) -> bool {
        if !self.auto_pause || !self.is_running() || !activity.is_inactive(now, threshold_ms) {
            return false;
        }
        self.pause(now)
    }
}
