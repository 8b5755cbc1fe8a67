//! Transient-failure retry policy for the underlying tool call.
//!
//! Distinct from the plan-level limiter: this decides whether a tool call
//! that already ran and failed is worth repeating.

use std::time::Duration;

const MAX_BACKOFF_SECS: u64 = 60;
const RETRYABLE_STATUS: [u16; 5] = [429, 500, 502, 503, 504];

/// `min(2^attempt, 60)` seconds.
pub fn backoff_secs(attempt: u32) -> u64 {
    2u64.checked_pow(attempt)
        .unwrap_or(u64::MAX)
        .min(MAX_BACKOFF_SECS)
}

pub fn should_retry(status: u16, attempt: u32, max_retries: u32) -> bool {
    attempt < max_retries && RETRYABLE_STATUS.contains(&status)
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn should_retry(&self, status: u16, attempt: u32) -> bool {
        should_retry(status, attempt, self.max_retries)
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_secs(backoff_secs(attempt))
    }
}
