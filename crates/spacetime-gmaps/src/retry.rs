//! Retry policy for rate-limited Maps API calls.
//!
//! [`retry_with_backoff`] re-sends the same request while the response status
//! is retryable under the injected [`BackoffPolicy`]. Any other failure is
//! returned immediately so that billed requests are never repeated blindly.

use std::future::Future;
use std::time::Duration;

use crate::error::GmapsError;

const HTTP_TOO_MANY_REQUESTS: u16 = 429;

/// Default retry predicate: only HTTP 429 is retried.
#[must_use]
pub fn is_rate_limited(status: u16) -> bool {
    status == HTTP_TOO_MANY_REQUESTS
}

/// How often and how long to wait before re-sending a rejected request.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Wait before the first retry.
    pub delay: Duration,
    /// Growth factor applied to `delay` for every further retry; `1` keeps
    /// the delay fixed.
    pub multiplier: u32,
    /// Which HTTP statuses are worth another attempt.
    pub retryable_status: fn(u16) -> bool,
}

impl Default for BackoffPolicy {
    /// Three attempts, 30 seconds apart, on HTTP 429 only.
    fn default() -> Self {
        Self::fixed(3, Duration::from_secs(30))
    }
}

impl BackoffPolicy {
    #[must_use]
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            multiplier: 1,
            retryable_status: is_rate_limited,
        }
    }

    /// Wait before retry number `retry` (1-based).
    #[must_use]
    pub fn delay_before(&self, retry: u32) -> Duration {
        let factor = self
            .multiplier
            .max(1)
            .saturating_pow(retry.saturating_sub(1));
        self.delay.saturating_mul(factor)
    }

    fn is_retryable(&self, err: &GmapsError) -> bool {
        err.status().is_some_and(self.retryable_status)
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// the policy's attempts are used up.
///
/// # Errors
///
/// - [`GmapsError::RateLimitExceeded`] when every attempt hit a retryable
///   status.
/// - Any non-retryable error from `operation`, unchanged.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: &BackoffPolicy,
    mut operation: F,
) -> Result<T, GmapsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GmapsError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if policy.is_retryable(&err) => {
                let status = err.status().unwrap_or_default();
                if attempt >= max_attempts {
                    return Err(GmapsError::RateLimitExceeded {
                        attempts: attempt,
                        status,
                    });
                }
                let delay = policy.delay_before(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    status,
                    delay_secs = delay.as_secs_f64(),
                    "Maps API rate limited; retrying the same request"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
