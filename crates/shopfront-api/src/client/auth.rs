//! Authentication and profile endpoints.

use serde_json::Value;
use shopfront_core::UserProfile;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::retry::{is_retriable, retry_with_backoff};
use crate::types::{AuthResponse, LoginRequest, RegisterRequest};

impl ApiClient {
    /// Exchanges credentials for a token and profile.
    ///
    /// `identifier` may be a username or an email address.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthenticationFailed`] for any failure, whether the
    /// credentials were rejected, the server was unreachable, or the response
    /// was malformed.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let request = self
            .client
            .post(self.endpoint("api/auth/local"))
            .json(&LoginRequest {
                identifier,
                password,
            });

        let body = self.send_json(request).await.map_err(|e| {
            tracing::warn!(error = %e, status = ?e.status(), "login request failed");
            ApiError::AuthenticationFailed
        })?;
        parse_auth(body).ok_or(ApiError::AuthenticationFailed)
    }

    /// Creates an account and returns its token and profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RegistrationFailed`] for any failure.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let request = self
            .client
            .post(self.endpoint("api/auth/local/register"))
            .json(&RegisterRequest {
                username,
                email,
                password,
            });

        let body = self.send_json(request).await.map_err(|e| {
            tracing::warn!(error = %e, status = ?e.status(), "registration request failed");
            ApiError::RegistrationFailed
        })?;
        parse_auth(body).ok_or(ApiError::RegistrationFailed)
    }

    /// Fetches the profile that `token` belongs to. Retried on transient errors.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::FetchFailed`] on any non-2xx status or transport
    /// failure, and [`ApiError::InvalidResponseFormat`] if the body is not a
    /// profile.
    pub async fn fetch_me(&self, token: &str) -> Result<UserProfile, ApiError> {
        let url = self.endpoint("api/users/me");
        let body = retry_with_backoff(self.retry, is_retriable, || {
            let url = url.clone();
            async move { self.send_json(self.client.get(url).bearer_auth(token)).await }
        })
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "profile fetch failed");
            ApiError::FetchFailed {
                resource: "current user",
                status: e.status(),
            }
        })?;

        serde_json::from_value(body).map_err(|e| ApiError::InvalidResponseFormat {
            context: format!("current user: {e}"),
        })
    }
}

fn parse_auth(body: Value) -> Option<AuthResponse> {
    serde_json::from_value::<AuthResponse>(body)
        .map_err(|e| tracing::warn!(error = %e, "auth response has unexpected shape"))
        .ok()
        .filter(|auth| !auth.jwt.is_empty())
}
