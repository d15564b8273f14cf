use crate::shared::constants::{RPC_BACKOFF_MS, RPC_MAX_RETRIES, RPC_TIMEOUT_MS};
use std::time::Duration;

/// Per-call timeout plus bounded exponential backoff for transient failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub call_timeout: Duration,
    pub max_retries: u32,
    pub base_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(call_timeout: Duration, max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            call_timeout,
            max_retries,
            base_backoff,
        }
    }

    /// Delay before retry number `attempt` (0-based): `base * 2^attempt`
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.base_backoff.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Worst-case wall time of one call including every retry
    pub fn max_total_duration(&self) -> Duration {
        let attempts = self.max_retries + 1;
        let waits = (0..self.max_retries).map(|a| self.backoff_for(a)).sum::<Duration>();
        self.call_timeout.saturating_mul(attempts) + waits
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(RPC_TIMEOUT_MS),
            RPC_MAX_RETRIES,
            Duration::from_millis(RPC_BACKOFF_MS),
        )
    }
}
