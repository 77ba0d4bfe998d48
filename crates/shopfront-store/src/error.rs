use std::path::PathBuf;

use shopfront_api::ApiError;
use thiserror::Error;

/// Errors returned by the session and cart stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The operation needs a signed-in user and there is none.
    #[error("not signed in")]
    NotAuthenticated,

    #[error("cart is empty")]
    EmptyCart,

    /// A quantity change would push a line or the cart total beyond what a
    /// `Decimal` can hold. The cart is left unchanged.
    #[error("quantity of product {product_id} is too large for the cart")]
    QuantityOverflow { product_id: i64 },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failures of the durable key-value storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but is not a JSON object of strings.
    #[error("session storage at {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {what} for session storage: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
