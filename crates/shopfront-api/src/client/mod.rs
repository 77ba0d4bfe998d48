//! HTTP client for the storefront's content API.
//!
//! Wraps `reqwest` with per-operation error mapping: each endpoint turns any
//! transport or status failure into the single [`ApiError`] kind for that
//! operation and logs the underlying cause. Response bodies are handed to
//! [`crate::normalize`] before they reach callers.

mod auth;
mod orders;
mod products;

pub use products::ImageUpload;

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use shopfront_core::AppConfig;

use crate::error::ApiError;
use crate::retry::{RequestFailure, RetryPolicy};

/// Longest error body kept for logging.
const MAX_LOGGED_BODY_CHARS: usize = 512;

/// Client for the content API.
///
/// Use [`ApiClient::from_config`] in the binary or [`ApiClient::new`] to point
/// at a mock server in tests.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    /// Applied to idempotent reads only.
    retry: RetryPolicy,
}

impl ApiClient {
    /// Creates a client for `base_url` with retries disabled.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidConfig`] if `base_url` is not an absolute
    /// http(s) URL or the underlying `reqwest::Client` cannot be built.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ApiError> {
        let normalised = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(normalised)
            .map_err(|e| ApiError::InvalidConfig(format!("invalid base URL '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidConfig(format!(
                "base URL '{base_url}' must use http or https"
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(|e| ApiError::InvalidConfig(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: normalised.to_owned(),
            retry: RetryPolicy::default(),
        })
    }

    /// Creates a client from the application config, including its retry policy.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Ok(
            Self::new(&config.api_url, config.request_timeout_secs, &config.user_agent)?
                .with_retry_policy(config.max_retries, config.retry_backoff_base_ms),
        )
    }

    /// Sets how many extra attempts idempotent reads get, and the base delay
    /// of the exponential back-off between them.
    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.retry = RetryPolicy {
            max_retries,
            backoff_base_ms,
        };
        self
    }

    /// Base URL without a trailing slash; relative media paths are joined onto it.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the absolute URL of an API path such as `api/products`.
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends a request, asserts a 2xx status, and parses the body as JSON.
    /// An empty 2xx body parses as `Value::Null`.
    async fn send_json(&self, request: RequestBuilder) -> Result<Value, RequestFailure> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RequestFailure::Status {
                status,
                body: body.chars().take(MAX_LOGGED_BODY_CHARS).collect(),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(RequestFailure::Body)
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
