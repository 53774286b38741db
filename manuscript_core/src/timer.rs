//! # Clocks and debounce timers
//!
//! **Time is a service, not a global variable.**
//!
//! Nothing here sleeps or spawns. A [`Clock`] reports monotonic
//! milliseconds when polled, and a [`DebounceTimer`] only remembers a
//! deadline; the owner polls and decides what firing means.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic millisecond source
///
/// Must never return a smaller value than a previous poll and must not
/// block.
pub trait Clock {
    fn poll_millis(&mut self) -> u64;
}

/// Wall-driven clock measuring from its own creation
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn poll_millis(&mut self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Hand-driven clock for tests and simulation
///
/// Clones share the same time, so a test can keep a handle and advance it
/// after moving the clock into a session.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(millis: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(millis)),
        }
    }

    pub fn advance(&self, millis: u64) {
        self.now.set(self.now.get().saturating_add(millis));
    }

    /// Moves time forward to `millis`; never moves it back
    pub fn set(&self, millis: u64) {
        self.now.set(self.now.get().max(millis));
    }

    pub fn now(&self) -> u64 {
        self.now.get()
    }
}

impl Clock for ManualClock {
    fn poll_millis(&mut self) -> u64 {
        self.now.get()
    }
}

/// Single pending deadline, restarted on every arm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTimer {
    delay_ms: u64,
    deadline: Option<u64>,
}

impl DebounceTimer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Takes effect on the next arm
    pub fn set_delay(&mut self, delay_ms: u64) {
        self.delay_ms = delay_ms;
    }

    /// (Re)starts the countdown from `now`
    pub fn arm(&mut self, now: u64) {
        self.deadline = Some(now.saturating_add(self.delay_ms));
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    pub fn is_due(&self, now: u64) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Disarms and returns true if the deadline has passed
    pub fn fire(&mut self, now: u64) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}
