//! Product listing and upload commands.

use std::path::Path;

use anyhow::Context;
use rust_decimal::Decimal;
use shopfront_api::{ApiClient, ApiError};
use shopfront_core::{format_money, NewProduct, Product};
use shopfront_store::SessionStore;

use crate::require_token;

pub(crate) async fn run_products(api: &ApiClient, sessions: &SessionStore) -> anyhow::Result<()> {
    require_token(sessions)?;
    let products = api.list_products().await.with_context(|| {
        format!(
            "could not load products; is the backend at {} reachable?",
            api.base_url()
        )
    })?;

    if products.is_empty() {
        println!("no products yet");
        return Ok(());
    }
    for product in &products {
        println!("{}", product_row(product));
    }
    Ok(())
}

pub(crate) async fn run_upload(
    api: &ApiClient,
    sessions: &SessionStore,
    name: String,
    price: Decimal,
    category: Option<String>,
    image: Option<&Path>,
) -> anyhow::Result<()> {
    let token = require_token(sessions)?;
    let new_product = build_new_product(name, price, category)?;

    match api.upload_product(&token, &new_product, image).await {
        Ok(product) => {
            println!("created product {}: {}", product.id, product.name);
            if image.is_some() {
                println!("image: {}", product.image);
            }
            Ok(())
        }
        Err(ApiError::PartialUploadFailure { product_id, .. }) => {
            tracing::warn!(product_id, "image upload failed after product creation");
            println!(
                "warning: product {product_id} was created, but its image could not be uploaded"
            );
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context("failed to create product")),
    }
}

/// Validates upload arguments and builds the create-product payload.
pub(crate) fn build_new_product(
    name: String,
    price: Decimal,
    category: Option<String>,
) -> anyhow::Result<NewProduct> {
    let name = name.trim().to_string();
    if name.is_empty() {
        anyhow::bail!("product name must not be empty");
    }
    if price.is_sign_negative() {
        anyhow::bail!("price must not be negative");
    }
    let category = category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    Ok(NewProduct {
        name,
        price,
        category,
    })
}

fn product_row(product: &Product) -> String {
    format!(
        "{:>6}  {:<32}  {:>10}  {}",
        product.id,
        product.name,
        format_money(product.price),
        product.category
    )
}
