//! The signed-in user's session: bearer token plus profile.
//!
//! [`SessionStore`] owns the single active session. Every change is written
//! to durable storage first and then applied in memory under one lock, so
//! callers never observe a token without its profile or memory that
//! disagrees with disk.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shopfront_api::{ApiClient, AuthResponse};
use shopfront_core::UserProfile;

use crate::error::{StorageError, StoreError};
use crate::storage::{KeyValueStore, AUTH_TOKEN_KEY, USER_DATA_KEY};

/// An authenticated session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub profile: UserProfile,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[redacted]")
            .field("profile", &self.profile)
            .finish()
    }
}

/// Holds the current session and keeps it in sync with durable storage.
pub struct SessionStore {
    api: ApiClient,
    storage: Arc<dyn KeyValueStore>,
    state: Mutex<Option<Session>>,
}

impl SessionStore {
    /// Creates an empty store. Call [`SessionStore::restore_session`] to
    /// pick up a session persisted by an earlier run.
    #[must_use]
    pub fn new(api: ApiClient, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            api,
            storage,
            state: Mutex::new(None),
        }
    }

    /// Signs in and persists the resulting session.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Api`] with `AuthenticationFailed` for any remote failure.
    /// - [`StoreError::Storage`] if the session cannot be persisted; the
    ///   previous session is then left in place.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<UserProfile, StoreError> {
        let auth = self.api.login(identifier, password).await?;
        tracing::info!(user_id = auth.user.id, "signed in");
        self.establish(auth)
    }

    /// Creates an account and persists the resulting session.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Api`] with `RegistrationFailed` for any remote failure.
    /// - [`StoreError::Storage`] if the session cannot be persisted.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, StoreError> {
        let auth = self.api.register(username, email, password).await?;
        tracing::info!(user_id = auth.user.id, "registered");
        self.establish(auth)
    }

    /// Clears the session from memory and durable storage. Never fails;
    /// storage errors are logged.
    pub fn logout(&self) {
        let mut state = self.lock_state();
        *state = None;
        if let Err(e) = self.storage.remove_all(&[AUTH_TOKEN_KEY, USER_DATA_KEY]) {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
        tracing::info!("signed out");
    }

    /// Loads a persisted session into memory.
    ///
    /// Returns the restored profile, or `None` when storage holds no
    /// complete, well-formed session. Unreadable storage counts as no session.
    pub fn restore_session(&self) -> Option<UserProfile> {
        let restored = match self.read_persisted() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable persisted session");
                None
            }
        };

        let mut state = self.lock_state();
        *state = restored;
        match state.as_ref() {
            Some(session) => {
                tracing::debug!(user_id = session.profile.id, "restored session");
                Some(session.profile.clone())
            }
            None => None,
        }
    }

    /// Re-fetches the current user's profile and stores it.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotAuthenticated`] when there is no session.
    /// - [`StoreError::Api`] with `FetchFailed` if the profile request fails.
    /// - [`StoreError::Storage`] if the refreshed profile cannot be persisted.
    pub async fn refresh_profile(&self) -> Result<UserProfile, StoreError> {
        let token = self.token().ok_or(StoreError::NotAuthenticated)?;
        let profile = self.api.fetch_me(&token).await?;

        let mut state = self.lock_state();
        match state.as_mut() {
            // A login or logout that resolved meanwhile takes precedence.
            Some(session) if session.token == token => {
                self.storage
                    .set_all(&[(USER_DATA_KEY, encode_profile(&profile)?)])?;
                session.profile = profile.clone();
            }
            _ => tracing::debug!("session changed during profile refresh; not stored"),
        }
        Ok(profile)
    }

    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.lock_state().clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock_state().as_ref().map(|s| s.token.clone())
    }

    #[must_use]
    pub fn profile(&self) -> Option<UserProfile> {
        self.lock_state().as_ref().map(|s| s.profile.clone())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock_state().is_some()
    }

    fn establish(&self, auth: AuthResponse) -> Result<UserProfile, StoreError> {
        let profile_json = encode_profile(&auth.user)?;

        let mut state = self.lock_state();
        self.storage
            .set_all(&[(AUTH_TOKEN_KEY, auth.jwt.clone()), (USER_DATA_KEY, profile_json)])?;
        *state = Some(Session {
            token: auth.jwt,
            profile: auth.user.clone(),
        });
        Ok(auth.user)
    }

    fn read_persisted(&self) -> Result<Option<Session>, StorageError> {
        let token = self.storage.get(AUTH_TOKEN_KEY)?;
        let user_data = self.storage.get(USER_DATA_KEY)?;

        let (Some(token), Some(user_data)) = (token, user_data) else {
            return Ok(None);
        };
        if token.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<UserProfile>(&user_data) {
            Ok(profile) => Ok(Some(Session { token, profile })),
            Err(e) => {
                tracing::warn!(error = %e, "persisted profile is malformed");
                Ok(None)
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, Option<Session>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn encode_profile(profile: &UserProfile) -> Result<String, StorageError> {
    serde_json::to_string(profile).map_err(|source| StorageError::Encode {
        what: "user profile",
        source,
    })
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
