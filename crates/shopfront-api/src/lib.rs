pub mod client;
pub mod error;
pub mod normalize;
pub(crate) mod retry;
pub mod types;

pub use client::{ApiClient, ImageUpload};
pub use error::ApiError;
pub use normalize::{normalize_collection, normalize_product};
pub use types::AuthResponse;
