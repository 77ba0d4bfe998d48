use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Backend record identifier for a product.
pub type ProductId = i64;

/// Image shown when a product has no uploaded media.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/500";

/// Name used when the backend record has none.
pub const UNNAMED_PRODUCT: &str = "Unnamed Product";

/// Category used when the backend record has none.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A product in canonical form, as produced by the response normalizer.
///
/// Every field is populated: missing backend values have already been
/// replaced with the sentinels above, and `image` is always an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price; never negative.
    pub price: Decimal,
    pub category: String,
    /// Absolute image URL, or [`PLACEHOLDER_IMAGE_URL`].
    pub image: String,
}

impl Product {
    /// Returns `true` if the product still shows the placeholder image.
    #[must_use]
    pub fn has_placeholder_image(&self) -> bool {
        self.image == PLACEHOLDER_IMAGE_URL
    }
}

/// Fields sent to the backend when creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Formats a money amount with exactly two decimal places, rounding half
/// away from zero. Only used for display; stored amounts keep full precision.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn format_money_pads_to_two_places() {
        assert_eq!(format_money(dec("9.5")), "9.50");
        assert_eq!(format_money(dec("10")), "10.00");
    }

    #[test]
    fn format_money_rounds_half_away_from_zero() {
        assert_eq!(format_money(dec("2.345")), "2.35");
        assert_eq!(format_money(dec("2.344")), "2.34");
    }

    #[test]
    fn product_serializes_flat_with_string_price() {
        let product = Product {
            id: 7,
            name: "Widget".to_string(),
            price: dec("9.5"),
            category: UNCATEGORIZED.to_string(),
            image: "http://h/u/1.png".to_string(),
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["price"], "9.5");
        assert_eq!(json["image"], "http://h/u/1.png");
        assert!(!product.has_placeholder_image());
    }

    #[test]
    fn new_product_sends_numeric_price_and_omits_missing_category() {
        let new = NewProduct {
            name: "Mug".to_string(),
            price: dec("12.99"),
            category: None,
        };
        let json = serde_json::to_value(&new).unwrap();
        assert_eq!(json["price"], serde_json::json!(12.99));
        assert!(json.get("category").is_none());
    }
}
