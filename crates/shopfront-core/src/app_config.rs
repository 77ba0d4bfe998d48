use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings for the storefront client, read from `SHOPFRONT_*`
/// environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// Base URL of the content API, without a trailing slash.
    pub api_url: String,
    pub log_level: String,
    /// JSON file holding the persisted session (`auth_token`, `user_data`).
    pub session_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Extra attempts for idempotent reads after a transient failure.
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}
