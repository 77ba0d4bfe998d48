//! Retry with exponential back-off and jitter for idempotent reads.
//!
//! Only the product listing and profile fetch go through
//! [`retry_with_backoff`]; writes (auth, product creation, uploads, orders)
//! are sent once so a slow success is never duplicated.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Raw outcome of a failed request, before it is mapped to the
/// operation-specific [`crate::ApiError`] kind.
#[derive(Debug, Error)]
pub(crate) enum RequestFailure {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("response body is not JSON: {0}")]
    Body(#[source] serde_json::Error),
}

impl RequestFailure {
    pub(crate) fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(status.as_u16()),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Body(_) => None,
        }
    }
}

/// Returns `true` for failures worth retrying after a back-off delay.
///
/// Retriable: connect errors, timeouts, HTTP 429 and 5xx.
/// Everything else (4xx, undecodable bodies) is returned immediately.
pub(crate) fn is_retriable(err: &RequestFailure) -> bool {
    match err {
        RequestFailure::Transport(e) => e.is_timeout() || e.is_connect(),
        RequestFailure::Status { status, .. } => {
            status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
        }
        RequestFailure::Body(_) => false,
    }
}

/// Back-off settings for idempotent reads.
///
/// Schedule with `backoff_base_ms = 500`, before jitter:
///
/// | Retry | Delay                 |
/// |-------|-----------------------|
/// | 1     | 500 ms                |
/// | 2     | 1 000 ms              |
/// | 3     | 2 000 ms              |
/// | n     | 500 ms × 2ⁿ⁻¹, ≤ 30 s |
///
/// Each delay is then scaled by a random factor in `[0.75, 1.25)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    const MAX_DELAY_MS: u64 = 30_000;

    /// Un-jittered delay before the given 1-based retry.
    pub(crate) fn base_delay_ms(self, retry: u32) -> u64 {
        let exponent = retry.saturating_sub(1).min(16);
        self.backoff_base_ms
            .saturating_mul(1u64 << exponent)
            .min(Self::MAX_DELAY_MS)
    }

    /// Applies a jitter factor (expected in `[0.75, 1.25)`) to the base delay.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub(crate) fn jittered_delay(self, retry: u32, factor: f64) -> Duration {
        let ms = (self.base_delay_ms(retry) as f64 * factor) as u64;
        Duration::from_millis(ms)
    }
}

/// Runs `operation` until it succeeds, `should_retry` rejects the error, or
/// the policy's retries are spent. The last error is returned unchanged.
pub(crate) async fn retry_with_backoff<T, E, F, Fut, P>(
    policy: RetryPolicy,
    should_retry: P,
    mut operation: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut retry = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retry >= policy.max_retries || !should_retry(&err) {
            return Err(err);
        }
        retry += 1;

        let delay = policy.jittered_delay(retry, rand::random::<f64>() * 0.5 + 0.75);
        tracing::warn!(
            retry,
            max_retries = policy.max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient API error, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}
