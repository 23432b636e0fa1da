//! Retry ceiling and exponential backoff

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum retry attempts per submission cycle
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay_ms: u64,
    /// Backoff cap
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 5000,
        }
    }
}

impl RetryPolicy {
    /// `min(base * 2^attempt_count, max)`, where `attempt_count` is the
    /// number of retries already made
    pub fn delay_for(&self, attempt_count: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt_count).unwrap_or(u64::MAX);
        let delay_ms = self
            .base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }

    #[inline]
    pub fn is_exhausted(&self, state: &RetryState) -> bool {
        state.attempt_count >= self.max_attempts
    }
}

/// Retry bookkeeping for the current submission cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RetryState {
    pub attempt_count: u32,
    pub last_delay_ms: u64,
}

impl RetryState {
    /// Record a retry about to wait `delay`
    pub(crate) fn record_attempt(&mut self, delay: Duration) {
        self.attempt_count += 1;
        self.last_delay_ms = delay.as_millis() as u64;
    }
}
