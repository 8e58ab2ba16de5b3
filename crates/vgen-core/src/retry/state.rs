//! Per-loop retry bookkeeping.

use std::time::Duration;

use super::classify::FailureClass;

/// State of one bounded retry loop (submission, polling or retrieval).
///
/// Created when the loop starts and dropped when it exits. Times are clock
/// readings (offsets from the driver's origin), not wall-clock instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    /// 1-based index of the attempt in flight or last completed.
    pub attempt: u32,
    pub started_at: Duration,
    pub last_failure: Option<FailureClass>,
}

impl RetryState {
    pub fn begin(at: Duration) -> Self {
        Self {
            attempt: 1,
            started_at: at,
            last_failure: None,
        }
    }

    pub fn elapsed(&self, at: Duration) -> Duration {
        at.saturating_sub(self.started_at)
    }

    pub fn record_failure(&mut self, class: FailureClass) {
        self.last_failure = Some(class);
    }

    pub fn advance(&mut self) {
        self.attempt += 1;
    }
}
