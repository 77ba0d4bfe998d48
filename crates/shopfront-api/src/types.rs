//! Wire types for the auth endpoints and request envelopes.
//!
//! Product and order bodies are handled as `serde_json::Value` and go through
//! [`crate::normalize`], because their shape varies across backend versions.
//! The auth endpoints have been stable: both return `{"jwt": .., "user": ..}`.

use serde::{Deserialize, Serialize};
use shopfront_core::UserProfile;

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Write endpoints expect the record under a `data` key.
#[derive(Debug, Serialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

/// Successful response from login or registration.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent authenticated calls.
    pub jwt: String,
    pub user: UserProfile,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("jwt", &"[redacted]")
            .field("user", &self.user)
            .finish()
    }
}
