//! Conflict retry runner shared by the transactional adapters.
//!
//! A read-dependent batch (confirm, revert, delete-with-revert) is executed as
//! a closure that opens its own transaction. When the commit reports
//! `Conflict` the closure runs again against fresh reads, with a short
//! exponential backoff, until the attempt budget is spent.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Tunable parameters for conflict retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Always at least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Policy without sleeping between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(200),
        }
    }
}

/// Runs `op` until it succeeds, fails with a non-conflict error, or the
/// attempt budget is spent. `op` receives the 1-based attempt number.
///
/// Only `Conflict` is retried here. `Connectivity` is left to the caller,
/// since a lost connection may have hidden a successful commit.
pub async fn retry_on_conflict<T, F, Fut>(
    policy: &RetryPolicy,
    op_name: &str,
    mut op: F,
) -> Result<T, DomainError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if err.code == ErrorCode::Conflict && attempt < policy.max_attempts => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    operation = op_name,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Transaction conflict, retrying against fresh reads"
                );
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                attempt += 1;
            }
            Err(err) if err.code == ErrorCode::Conflict => {
                tracing::warn!(
                    operation = op_name,
                    attempts = attempt,
                    "Transaction conflict persisted, giving up"
                );
                return Err(err.with_detail("attempts", attempt.to_string()));
            }
            Err(err) => return Err(err),
        }
    }
}
