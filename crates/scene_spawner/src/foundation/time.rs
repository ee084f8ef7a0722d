//! Time management utilities
//!
//! Everything that expires reads time through [`Clock`], so tests can drive
//! expiry with a [`ManualClock`] instead of sleeping.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of "now", measured from the clock's own origin
pub trait Clock {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;
}

/// Monotonic wall clock
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Create a clock whose origin is the current instant
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Virtual clock advanced by hand
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    /// Create a clock stopped at its origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Move the clock forward by fractional seconds
    pub fn advance_secs(&self, secs: f32) {
        self.advance(Duration::from_secs_f32(secs));
    }

    /// Jump to an absolute time
    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Point in clock time after which something is considered expired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    /// Time the current period started
    pub started_at: Duration,
    /// Length of one period; zero means "never expires"
    pub duration: Duration,
}

impl Expiry {
    /// Create a new expiry window
    pub fn new(started_at: Duration, duration: Duration) -> Self {
        Self {
            started_at,
            duration,
        }
    }

    /// Clock time at which the window closes, `None` for infinite windows
    pub fn expires_at(&self) -> Option<Duration> {
        if self.duration.is_zero() {
            None
        } else {
            Some(self.started_at + self.duration)
        }
    }

    /// Check if the window has closed
    pub fn is_expired(&self, now: Duration) -> bool {
        self.expires_at().map_or(false, |at| now >= at)
    }

    /// Get remaining time, `None` for infinite windows
    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        self.expires_at().map(|at| at.saturating_sub(now))
    }

    /// Start a fresh window of the same length at `now`
    pub fn restart(&mut self, now: Duration) {
        self.started_at = now;
    }
}
