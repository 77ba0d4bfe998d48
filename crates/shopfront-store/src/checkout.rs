//! Order placement from the cart.

use shopfront_api::ApiClient;
use shopfront_core::OrderReceipt;

use crate::cart::CartStore;
use crate::error::StoreError;
use crate::session::SessionStore;

/// Submits the cart as a pending order for the signed-in user.
///
/// The cart is cleared only after the backend accepts the order; on any
/// error it is left exactly as it was.
///
/// # Errors
///
/// - [`StoreError::NotAuthenticated`] when there is no session.
/// - [`StoreError::EmptyCart`] when the cart has no lines.
/// - [`StoreError::Api`] with `OrderCreationFailed` if the backend rejects
///   the order or cannot be reached.
pub async fn checkout(
    cart: &mut CartStore,
    sessions: &SessionStore,
    api: &ApiClient,
) -> Result<OrderReceipt, StoreError> {
    let token = sessions.token().ok_or(StoreError::NotAuthenticated)?;
    if cart.is_empty() {
        return Err(StoreError::EmptyCart);
    }

    let order = cart.to_order_request();
    let receipt = api.create_order(&token, &order).await?;

    tracing::info!(
        order_id = receipt.id,
        items = cart.item_count(),
        total = %order.total,
        "checkout complete"
    );
    cart.clear_cart();
    Ok(receipt)
}
