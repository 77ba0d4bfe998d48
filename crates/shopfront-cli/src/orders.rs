//! The `checkout` command: build a cart from the catalog and place the order.

use std::collections::HashMap;
use std::str::FromStr;

use shopfront_api::{ApiClient, ApiError};
use shopfront_core::{format_money, Product, ProductId};
use shopfront_store::{checkout, CartStore, SessionStore, StoreError};

use crate::require_token;

/// A `--item` argument: `ID` or `ID:QTY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ItemSpec {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl FromStr for ItemSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, quantity) = match s.split_once(':') {
            Some((id, qty)) => (id, qty),
            None => (s, "1"),
        };
        let product_id = id
            .trim()
            .parse::<ProductId>()
            .map_err(|_| format!("invalid product id '{id}'"))?;
        let quantity = quantity
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid quantity '{quantity}'"))?;
        if quantity == 0 {
            return Err("quantity must be at least 1".to_string());
        }
        Ok(Self {
            product_id,
            quantity,
        })
    }
}

pub(crate) async fn run_checkout(
    api: &ApiClient,
    sessions: &SessionStore,
    items: &[ItemSpec],
) -> anyhow::Result<()> {
    require_token(sessions)?;
    let products = api
        .list_products()
        .await
        .map_err(|e| anyhow::Error::new(e).context("could not load the catalog"))?;

    let mut cart = fill_cart(&products, items)?;
    print_summary(&cart);

    match checkout(&mut cart, sessions, api).await {
        Ok(receipt) => {
            println!("order {} placed", receipt.id);
            Ok(())
        }
        Err(StoreError::Api(e @ ApiError::OrderCreationFailed { .. })) => {
            tracing::warn!(error = %e, items = cart.item_count(), "checkout failed");
            anyhow::bail!(
                "could not place the order ({e}); your cart of {} item(s) totalling {} was kept, please try again",
                cart.item_count(),
                cart.display_total()
            )
        }
        Err(e) => Err(anyhow::Error::new(e).context("checkout failed")),
    }
}

/// Adds each requested product to a fresh cart. Repeated ids accumulate.
pub(crate) fn fill_cart(products: &[Product], items: &[ItemSpec]) -> anyhow::Result<CartStore> {
    let by_id: HashMap<ProductId, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut cart = CartStore::new();
    for item in items {
        let product = by_id
            .get(&item.product_id)
            .ok_or_else(|| anyhow::anyhow!("product {} not found", item.product_id))?;
        let current = cart.line(item.product_id).map_or(0, |line| line.quantity);
        cart.add_to_cart(product)?;
        cart.update_quantity(
            item.product_id,
            i64::from(current) + i64::from(item.quantity),
        )?;
    }
    Ok(cart)
}

fn print_summary(cart: &CartStore) {
    for line in cart.lines() {
        println!(
            "{:>3} x {:<32} {:>10}",
            line.quantity,
            line.name,
            format_money(line.subtotal())
        );
    }
    println!("{} item(s), total {}", cart.item_count(), cart.display_total());
}
