//! In-memory shopping cart.
//!
//! Lines keep insertion order and are unique per product. Totals are derived
//! on every read and kept exact; rounding happens only in
//! [`CartStore::display_total`]. A change that would make the total
//! unrepresentable is rejected with [`StoreError::QuantityOverflow`].

use std::iter;

use rust_decimal::Decimal;
use shopfront_core::{format_money, OrderLine, OrderRequest, Product, ProductId};

use crate::error::StoreError;

/// One cart entry. Display fields are captured when the product is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    /// Always at least 1; a line that would reach 0 is removed instead.
    pub quantity: u32,
}

impl CartLine {
    fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity: 1,
        }
    }

    /// Price × quantity. Bounded by the cart total, which mutations keep
    /// representable.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or(Decimal::MAX)
    }
}

/// Σ price × quantity, or `None` if any step overflows.
fn checked_total(lines: impl IntoIterator<Item = (Decimal, u32)>) -> Option<Decimal> {
    lines.into_iter().try_fold(Decimal::ZERO, |acc, (price, quantity)| {
        price
            .checked_mul(Decimal::from(quantity))
            .and_then(|subtotal| acc.checked_add(subtotal))
    })
}

#[derive(Debug, Clone, Default)]
pub struct CartStore {
    lines: Vec<CartLine>,
}

impl CartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `product`, merging into its existing line if present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::QuantityOverflow`] if the extra unit would make
    /// the total unrepresentable; the cart is unchanged.
    pub fn add_to_cart(&mut self, product: &Product) -> Result<(), StoreError> {
        let overflow = StoreError::QuantityOverflow {
            product_id: product.id,
        };
        if let Some(index) = self.position(product.id) {
            let quantity = self.lines[index].quantity.checked_add(1).ok_or(overflow)?;
            self.set_quantity_at(index, quantity)?;
            tracing::debug!(product_id = product.id, quantity, "cart line incremented");
        } else {
            let pending = iter::once((product.price, 1));
            checked_total(self.priced_lines().chain(pending)).ok_or(overflow)?;
            self.lines.push(CartLine::from_product(product));
            tracing::debug!(product_id = product.id, "cart line added");
        }
        Ok(())
    }

    /// Removes the line for `product_id`; absent ids are ignored.
    pub fn remove_from_cart(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.product_id != product_id);
    }

    /// Sets a line's quantity exactly. Zero or negative removes the line;
    /// an unknown id is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::QuantityOverflow`] if the quantity does not fit
    /// a `u32` or would make the total unrepresentable; the line keeps its
    /// previous quantity.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        new_quantity: i64,
    ) -> Result<(), StoreError> {
        if new_quantity <= 0 {
            self.remove_from_cart(product_id);
            return Ok(());
        }
        let Some(index) = self.position(product_id) else {
            return Ok(());
        };
        let quantity = u32::try_from(new_quantity)
            .map_err(|_| StoreError::QuantityOverflow { product_id })?;
        self.set_quantity_at(index, quantity)
    }

    pub fn clear_cart(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    #[must_use]
    pub fn line_subtotal(&self, product_id: ProductId) -> Option<Decimal> {
        self.line(product_id).map(CartLine::subtotal)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Exact sum of price × quantity.
    #[must_use]
    pub fn total(&self) -> Decimal {
        checked_total(self.priced_lines()).unwrap_or(Decimal::MAX)
    }

    /// The total rounded to two decimal places for display.
    #[must_use]
    pub fn display_total(&self) -> String {
        format_money(self.total())
    }

    /// Builds a pending order from the current lines and total.
    #[must_use]
    pub fn to_order_request(&self) -> OrderRequest {
        let items = self
            .lines
            .iter()
            .map(|line| OrderLine {
                product: line.product_id,
                quantity: line.quantity,
                price: line.price,
            })
            .collect();
        OrderRequest::pending(items, self.total())
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.lines.iter().position(|line| line.product_id == product_id)
    }

    fn priced_lines(&self) -> impl Iterator<Item = (Decimal, u32)> + '_ {
        self.lines.iter().map(|line| (line.price, line.quantity))
    }

    /// Sets the quantity of the line at `index` if the resulting total stays
    /// representable.
    fn set_quantity_at(&mut self, index: usize, quantity: u32) -> Result<(), StoreError> {
        let candidate = self.lines.iter().enumerate().map(|(i, line)| {
            let q = if i == index { quantity } else { line.quantity };
            (line.price, q)
        });
        let line = &self.lines[index];
        if checked_total(candidate).is_none() {
            tracing::warn!(
                product_id = line.product_id,
                quantity,
                "rejected cart quantity; total would overflow"
            );
            return Err(StoreError::QuantityOverflow {
                product_id: line.product_id,
            });
        }
        self.lines[index].quantity = quantity;
        Ok(())
    }
}

#[cfg(test)]
#[path = "cart_test.rs"]
mod tests;
