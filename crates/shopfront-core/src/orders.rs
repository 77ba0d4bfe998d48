use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::products::ProductId;

/// Status assigned to every order at creation.
pub const ORDER_STATUS_PENDING: &str = "pending";

/// One line of an order: which product, how many, and the unit price
/// captured when it was added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub product: ProductId,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Payload for the create-order endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub items: Vec<OrderLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(rename = "orderStatus")]
    pub order_status: String,
}

impl OrderRequest {
    /// Builds a pending order from its lines and precomputed total.
    #[must_use]
    pub fn pending(items: Vec<OrderLine>, total: Decimal) -> Self {
        Self {
            items,
            total,
            order_status: ORDER_STATUS_PENDING.to_string(),
        }
    }
}

/// The order record the backend created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderReceipt {
    pub id: i64,
    #[serde(default, rename = "documentId")]
    pub document_id: Option<String>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "orderStatus")]
    pub order_status: Option<String>,
}
