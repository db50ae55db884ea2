//! Bounded retry with backoff and per-attempt timeouts.
//!
//! Every backend and capability call in a pipeline step goes through
//! [`RetryExecutor::invoke`]. Failures are classified by
//! [`AppError::is_retryable`](crate::types::AppError::is_retryable):
//! retryable failures are absorbed up to `max_attempts`, fatal failures
//! short-circuit immediately without consuming remaining attempts.

use crate::types::{AppError, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Delay strategy between retryable failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackoffStrategy {
    /// The same delay after every failed attempt.
    Fixed(Duration),
    /// `base * 2^attempt`, capped at `cap`.
    Exponential {
        /// Delay after the first failed attempt.
        base: Duration,
        /// Upper bound on the computed delay.
        cap: Duration,
    },
}

impl BackoffStrategy {
    /// Deterministic delay after the failed attempt with the given
    /// zero-based index. Monotonically non-decreasing in `attempt`;
    /// jitter is layered on top by the executor.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Exponential { base, cap } => {
                let factor = 2u32.saturating_pow(attempt.min(16));
                base.saturating_mul(factor).min(*cap)
            }
        }
    }
}

/// Validated retry parameters for one agent's backend calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempt budget, including the first call.
    pub max_attempts: u32,
    /// Time budget for a single attempt; exceeding it cancels the
    /// in-flight call and counts as a retryable failure.
    pub per_attempt_timeout: Duration,
    /// Delay strategy between retryable failures.
    pub backoff: BackoffStrategy,
}

impl RetryPolicy {
    /// Create a validated policy.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] when `max_attempts` is zero or
    /// `per_attempt_timeout` is zero.
    pub fn new(
        max_attempts: u32,
        per_attempt_timeout: Duration,
        backoff: BackoffStrategy,
    ) -> Result<Self> {
        if max_attempts < 1 {
            return Err(AppError::Configuration(
                "retry policy requires max_attempts >= 1".to_string(),
            ));
        }
        if per_attempt_timeout.is_zero() {
            return Err(AppError::Configuration(
                "retry policy requires a non-zero per-attempt timeout".to_string(),
            ));
        }
        Ok(Self {
            max_attempts,
            per_attempt_timeout,
            backoff,
        })
    }
}

/// Executes a single logical invocation under a [`RetryPolicy`].
pub struct RetryExecutor;

impl RetryExecutor {
    /// Attempt `op` up to `policy.max_attempts` times.
    ///
    /// Each attempt races against `per_attempt_timeout` and the caller's
    /// cancellation token; the backoff sleep between attempts is equally
    /// cancellable. After the attempt budget is exhausted the last
    /// retryable error is converted to [`AppError::FatalBackend`] so the
    /// caller sees a single fatal outcome.
    pub async fn invoke<T, F, Fut>(
        policy: &RetryPolicy,
        cancel: &CancellationToken,
        mut op: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error: Option<AppError> = None;

        for attempt in 0..policy.max_attempts {
            if cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }

            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(AppError::Cancelled),
                attempt_result = tokio::time::timeout(policy.per_attempt_timeout, op()) => {
                    match attempt_result {
                        Ok(result) => result,
                        Err(_) => Err(AppError::Timeout(policy.per_attempt_timeout)),
                    }
                }
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts = policy.max_attempts,
                        error = %error,
                        "retryable failure"
                    );
                    last_error = Some(error);

                    if attempt + 1 < policy.max_attempts {
                        let delay = with_jitter(policy.backoff.delay_for_attempt(attempt));
                        tokio::select! {
                            _ = cancel.cancelled() => return Err(AppError::Cancelled),
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                }
                Err(error) => return Err(error),
            }
        }

        let last = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        Err(AppError::FatalBackend(format!(
            "retries exhausted after {} attempts: {}",
            policy.max_attempts, last
        )))
    }
}

/// Add up to 25% random jitter so concurrent retries do not hammer the
/// backend in lockstep. The bound keeps the total delay monotonically
/// non-decreasing for exponential backoff below its cap.
fn with_jitter(delay: Duration) -> Duration {
    let jitter_cap_ms = (delay.as_millis() / 4) as u64;
    if jitter_cap_ms == 0 {
        return delay;
    }
    let jitter_ms = rand::rng().random_range(0..=jitter_cap_ms);
    delay + Duration::from_millis(jitter_ms)
}
