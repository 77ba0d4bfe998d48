//! Sign-in, sign-up and session commands.

use anyhow::Context;
use shopfront_api::ApiError;
use shopfront_store::{SessionStore, StoreError};

pub(crate) async fn run_login(
    sessions: &SessionStore,
    identifier: &str,
    password: &str,
) -> anyhow::Result<()> {
    let profile = sessions
        .login(identifier, password)
        .await
        .map_err(|e| match e {
            StoreError::Api(ApiError::AuthenticationFailed) => {
                anyhow::anyhow!("login failed: invalid credentials")
            }
            other => anyhow::Error::new(other).context("login failed"),
        })?;
    println!("signed in as {} <{}>", profile.username, profile.email);
    Ok(())
}

pub(crate) async fn run_register(
    sessions: &SessionStore,
    username: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> anyhow::Result<()> {
    validate_registration(password, confirm_password)?;
    let profile = sessions
        .register(username, email, password)
        .await
        .map_err(|e| match e {
            StoreError::Api(ApiError::RegistrationFailed) => anyhow::anyhow!(
                "registration failed: the username or email may already be taken"
            ),
            other => anyhow::Error::new(other).context("registration failed"),
        })?;
    println!("account created; signed in as {}", profile.username);
    Ok(())
}

pub(crate) fn run_logout(sessions: &SessionStore) {
    sessions.logout();
    println!("signed out");
}

pub(crate) async fn run_whoami(sessions: &SessionStore, remote: bool) -> anyhow::Result<()> {
    let Some(stored) = sessions.profile() else {
        println!("not signed in");
        return Ok(());
    };
    let profile = if remote {
        sessions
            .refresh_profile()
            .await
            .context("could not refresh profile; the session may have expired")?
    } else {
        stored
    };
    println!("{} <{}> (id {})", profile.username, profile.email, profile.id);
    Ok(())
}

/// Local checks done before the sign-up request is sent.
pub(crate) fn validate_registration(password: &str, confirm_password: &str) -> anyhow::Result<()> {
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }
    if password != confirm_password {
        anyhow::bail!("passwords do not match");
    }
    Ok(())
}
