//! Order creation.

use shopfront_core::{OrderReceipt, OrderRequest};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::normalize::single_record;
use crate::types::DataEnvelope;

impl ApiClient {
    /// Submits an order. Never retried, so a slow success cannot produce a
    /// duplicate order.
    ///
    /// # Errors
    ///
    /// - [`ApiError::OrderCreationFailed`] on any non-2xx status or transport failure.
    /// - [`ApiError::InvalidResponseFormat`] if the created order cannot be read.
    pub async fn create_order(
        &self,
        token: &str,
        order: &OrderRequest,
    ) -> Result<OrderReceipt, ApiError> {
        let request = self
            .client
            .post(self.endpoint("api/orders"))
            .bearer_auth(token)
            .json(&DataEnvelope { data: order });

        let body = self.send_json(request).await.map_err(|e| {
            tracing::warn!(error = %e, lines = order.items.len(), "create order failed");
            ApiError::OrderCreationFailed { status: e.status() }
        })?;

        let receipt: OrderReceipt = serde_json::from_value(single_record(&body).clone())
            .map_err(|e| ApiError::InvalidResponseFormat {
                context: format!("created order: {e}"),
            })?;
        tracing::info!(order_id = receipt.id, total = %order.total, "order created");
        Ok(receipt)
    }
}
