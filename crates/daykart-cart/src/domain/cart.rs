//! Cart entries, resolved lines and totals.

use daykart_catalog::Product;
use serde::{Deserialize, Serialize};

/// One persisted cart entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Product identifier.
    pub id: u64,
    /// Quantity, at least 1.
    pub quantity: u32,
}

/// A cart entry joined with its product.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// The product in the cart.
    pub product: Product,
    /// Quantity, at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// Price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }

    /// Discount against the original price, times quantity. Zero when the
    /// product is not discounted.
    #[must_use]
    pub fn savings(&self) -> f64 {
        self.product
            .original_price
            .filter(|original| *original > self.product.price)
            .map_or(0.0, |original| {
                (original - self.product.price) * f64::from(self.quantity)
            })
    }
}

/// Joins `entries` with `products`, in cart order. Entries whose product no
/// longer exists are skipped.
#[must_use]
pub fn resolve_lines(entries: &[CartEntry], products: &[Product]) -> Vec<CartLine> {
    entries
        .iter()
        .filter_map(|entry| {
            products
                .iter()
                .find(|product| product.id == entry.id)
                .map(|product| CartLine {
                    product: product.clone(),
                    quantity: entry.quantity,
                })
        })
        .collect()
}

/// Totals for a resolved cart.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Number of distinct products.
    pub line_count: usize,
    /// Sum of quantities.
    pub item_count: u64,
    /// Sum of line subtotals.
    pub total: f64,
    /// Sum of line savings.
    pub savings: f64,
}

impl CartSummary {
    /// Computes the totals for `lines`.
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        Self {
            line_count: lines.len(),
            item_count: lines.iter().map(|line| u64::from(line.quantity)).sum(),
            total: lines.iter().map(CartLine::subtotal).sum(),
            savings: lines.iter().map(CartLine::savings).sum(),
        }
    }
}
