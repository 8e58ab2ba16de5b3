use std::time::Duration;

use super::classify::FailureClass;

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `2^attempt` seconds after failed attempt `attempt` (1-based): 2s, 4s, 8s, ...
    Exponential,
    /// The same delay after every failed attempt.
    Fixed(Duration),
}

impl Backoff {
    /// Delay to wait after failed attempt `attempt` (1-based). No jitter.
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Backoff::Exponential => Duration::from_secs(1u64 << attempt.clamp(1, 16)),
            Backoff::Fixed(d) => d,
        }
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// This kind of failure is not retried by the policy.
    NoRetry,
    /// Retryable, but the attempt budget is spent.
    Exhausted,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Bounded retry policy for one retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    pub backoff: Backoff,
    /// The only classification this loop retries.
    pub retry_on: FailureClass,
}

impl RetryPolicy {
    /// Job creation: 3 attempts, exponential backoff, server failures only.
    pub const fn submission() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Exponential,
            retry_on: FailureClass::RetryableServer,
        }
    }

    /// Artifact download: 12 attempts 10s apart, "not ready" only.
    pub const fn download() -> Self {
        Self {
            max_attempts: 12,
            backoff: Backoff::Fixed(Duration::from_secs(10)),
            retry_on: FailureClass::RetryableTransient,
        }
    }

    /// Decide what to do after failed attempt `attempt` (1-based).
    pub fn decide(&self, attempt: u32, class: FailureClass) -> RetryDecision {
        if class != self.retry_on {
            return RetryDecision::NoRetry;
        }
        if attempt >= self.max_attempts {
            return RetryDecision::Exhausted;
        }
        RetryDecision::RetryAfter(self.backoff.delay(attempt))
    }

    /// Nominal time span covered by the whole budget, used in exhaustion messages.
    pub fn window(&self) -> Duration {
        (1..=self.max_attempts).map(|a| self.backoff.delay(a)).sum()
    }
}
