pub mod app_config;
pub mod config;
pub mod orders;
pub mod products;
pub mod users;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use orders::{OrderLine, OrderReceipt, OrderRequest, ORDER_STATUS_PENDING};
pub use products::{
    format_money, NewProduct, Product, ProductId, PLACEHOLDER_IMAGE_URL, UNCATEGORIZED,
    UNNAMED_PRODUCT,
};
pub use users::UserProfile;

/// Every setting has a default, so the only failure is a value that is set
/// but unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
