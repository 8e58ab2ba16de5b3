//! Time source for the blocking driver.
//!
//! Readings are offsets from the clock's origin so the workflow can compute
//! elapsed times without touching wall-clock APIs directly.

use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::control::AbortToken;

/// Granularity at which a sleeping thread re-checks the abort token.
const ABORT_CHECK_INTERVAL: Duration = Duration::from_millis(200);

pub trait Clock: Send + Sync {
    /// Time since the clock's origin.
    fn now(&self) -> Duration;

    /// Block for `delay`. Returns `false` if `abort` was raised before the
    /// delay ran out.
    fn sleep(&self, delay: Duration, abort: &AbortToken) -> bool;
}

/// Real time, measured from construction.
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
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, delay: Duration, abort: &AbortToken) -> bool {
        let deadline = Instant::now() + delay;
        loop {
            if abort.is_raised() {
                return false;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return true;
            }
            thread::sleep(remaining.min(ABORT_CHECK_INTERVAL));
        }
    }
}

/// Virtual time: `sleep` returns immediately, advances the clock and records
/// the requested delay. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward without recording a sleep (time spent in a call).
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    /// Every delay passed to `sleep`, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sleep(&self, delay: Duration, abort: &AbortToken) -> bool {
        if abort.is_raised() {
            return false;
        }
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(delay);
        self.advance(delay);
        true
    }
}
