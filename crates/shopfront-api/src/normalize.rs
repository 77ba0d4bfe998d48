//! Normalization from raw content-API records to [`shopfront_core::Product`].
//!
//! The backend has shipped two response formats over its versions:
//!
//! - **Current**: scalar fields sit directly on the record and media fields are
//!   plain objects, e.g. `{"id": 7, "name": "Widget", "image": {"url": "/u/1.png"}}`.
//! - **Legacy**: scalar fields are wrapped in `attributes` and media fields are
//!   doubly nested, e.g.
//!   `{"id": 7, "attributes": {"name": "Widget", "image": {"data": {"attributes": {"url": "/u/1.png"}}}}}`.
//!
//! Each field is probed in a fixed order (direct, then `attributes`) and falls
//! back to a sentinel when absent, so a single malformed record never fails a
//! whole listing. Only a missing collection envelope is an error.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;
use shopfront_core::{Product, ProductId, PLACEHOLDER_IMAGE_URL, UNCATEGORIZED, UNNAMED_PRODUCT};

use crate::error::ApiError;

/// Normalizes a collection response (`{"data": [...]}`) into products, in
/// response order.
///
/// Records without a usable identifier are skipped with a warning.
///
/// # Errors
///
/// Returns [`ApiError::InvalidResponseFormat`] if `data` is absent or is not
/// an array.
pub fn normalize_collection(body: &Value, base_url: &str) -> Result<Vec<Product>, ApiError> {
    let items = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::InvalidResponseFormat {
            context: "product list has no `data` array".to_string(),
        })?;

    Ok(items
        .iter()
        .filter_map(|item| normalize_product(item, base_url))
        .collect())
}

/// Normalizes one raw record. Returns `None` only when the record has no
/// identifier, since an unkeyed product cannot be put in a cart.
#[must_use]
pub fn normalize_product(raw: &Value, base_url: &str) -> Option<Product> {
    let Some(id) = record_id(raw) else {
        tracing::warn!(record = %raw, "skipping product record without an id");
        return None;
    };

    let name = text_field(raw, "name").unwrap_or_else(|| UNNAMED_PRODUCT.to_string());
    let category = text_field(raw, "category").unwrap_or_else(|| UNCATEGORIZED.to_string());
    let price = match field(raw, "price") {
        None => Decimal::ZERO,
        Some(value) => parse_price(value).unwrap_or_else(|| {
            tracing::warn!(product_id = id, price = %value, "unusable price, defaulting to 0");
            Decimal::ZERO
        }),
    };
    let image = resolve_image(field(raw, "image"), base_url);

    Some(Product {
        id,
        name,
        price,
        category,
        image,
    })
}

/// Unwraps a single-record response: `{"data": {...}}` yields the inner
/// object, anything else is returned as-is.
#[must_use]
pub fn single_record(body: &Value) -> &Value {
    match body.get("data") {
        Some(inner) if inner.is_object() => inner,
        _ => body,
    }
}

/// Resolves the image URL of an uploaded file from the upload endpoint's
/// response (an array of file records).
#[must_use]
pub fn uploaded_file_url(body: &Value, base_url: &str) -> Option<String> {
    body.as_array()?
        .first()?
        .get("url")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(|path| absolute_url(path, base_url))
}

fn record_id(raw: &Value) -> Option<ProductId> {
    match raw.get("id")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Looks a field up on the record itself, then under `attributes`.
fn field<'a>(raw: &'a Value, key: &str) -> Option<&'a Value> {
    raw.get(key)
        .filter(|v| !v.is_null())
        .or_else(|| {
            raw.get("attributes")
                .and_then(|attrs| attrs.get(key))
                .filter(|v| !v.is_null())
        })
}

fn text_field(raw: &Value, key: &str) -> Option<String> {
    field(raw, key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Accepts a JSON number or a decimal string. Negative values are rejected.
fn parse_price(value: &Value) -> Option<Decimal> {
    let parsed = match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }?;
    (!parsed.is_sign_negative()).then_some(parsed.normalize())
}

/// Media shapes, tried in order: an already-resolved URL string, the current
/// `image.url`, the legacy `image.data.attributes.url`, then the placeholder.
fn resolve_image(image: Option<&Value>, base_url: &str) -> String {
    let Some(image) = image else {
        return PLACEHOLDER_IMAGE_URL.to_string();
    };

    let path = image
        .as_str()
        .or_else(|| image.get("url").and_then(Value::as_str))
        .or_else(|| image.pointer("/data/attributes/url").and_then(Value::as_str))
        .filter(|s| !s.is_empty());

    path.map_or_else(
        || PLACEHOLDER_IMAGE_URL.to_string(),
        |p| absolute_url(p, base_url),
    )
}

/// Joins a server-relative path onto the API base URL. Paths that are already
/// absolute (e.g. from a CDN upload provider) are kept.
fn absolute_url(path: &str, base_url: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
