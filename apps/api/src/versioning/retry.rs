use std::time::Duration;

use tokio_retry2::strategy::{jitter, ExponentialBackoff};

/// Upper bound on a single backoff sleep.
const MAX_BACKOFF: Duration = Duration::from_millis(250);

/// Bounded retry budget for compare-and-swap loops.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(20),
        }
    }
}

impl RetryPolicy {
    /// Sleeps between attempts: retry `n` (1-based) waits a uniformly random
    /// duration below `base * 2^n`, capped at [`MAX_BACKOFF`]. Yields one
    /// fewer delay than `max_attempts`.
    pub fn strategy(&self) -> impl Iterator<Item = Duration> {
        let base_ms = self.base_delay.as_millis() as u64;
        ExponentialBackoff::from_millis(2)
            .factor(base_ms)
            .max_delay(MAX_BACKOFF)
            .map(jitter)
            .take(self.max_attempts.max(1) as usize - 1)
    }
}
