use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`crate::ApiClient`].
///
/// Transport failures never appear here directly: each endpoint maps them to
/// the failure kind of the operation that was attempted, and the underlying
/// cause is logged instead.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The response was missing the expected envelope (e.g. no `data` array).
    #[error("invalid response format: {context}")]
    InvalidResponseFormat { context: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("registration failed")]
    RegistrationFailed,

    /// A read of the current profile or the product list failed.
    #[error("failed to fetch {resource}{}", status_suffix(.status))]
    FetchFailed {
        resource: &'static str,
        status: Option<u16>,
    },

    #[error("failed to create product entry{}", status_suffix(.status))]
    ProductCreationFailed { status: Option<u16> },

    /// The product record exists but its image could not be attached. The
    /// record is not rolled back.
    #[error("product {product_id} created but image upload failed{}", status_suffix(.status))]
    PartialUploadFailure {
        product_id: i64,
        status: Option<u16>,
    },

    #[error("failed to create order{}", status_suffix(.status))]
    OrderCreationFailed { status: Option<u16> },

    /// A local image file could not be read before upload.
    #[error("cannot read image {}: {source}", .path.display())]
    Media {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// HTTP status attached to the failure, when the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::FetchFailed { status, .. }
            | Self::ProductCreationFailed { status }
            | Self::PartialUploadFailure { status, .. }
            | Self::OrderCreationFailed { status } => *status,
            _ => None,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map_or_else(String::new, |s| format!(" (HTTP {s})"))
}
