//! Catalog figures shown on the admin dashboard.

use serde::Serialize;

use crate::domain::product::{Category, Product};

/// Number of products in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// The category.
    pub category: Category,
    /// Display label of the category.
    pub label: &'static str,
    /// Products in the category.
    pub count: usize,
}

/// Read-only summary of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    /// Number of products.
    pub total_products: usize,
    /// Sum of current prices.
    pub total_value: f64,
    /// Mean rating, 0 for an empty catalog.
    pub average_rating: f64,
    /// Sum of review counts.
    pub total_reviews: u64,
    /// Product count for every category, including empty ones.
    pub category_breakdown: Vec<CategoryCount>,
}

impl CatalogStats {
    /// Computes the summary for `products`.
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        let total_value = products.iter().map(|p| p.price).sum();
        let rating_sum: f64 = products.iter().map(|p| p.rating).sum();
        #[allow(clippy::cast_precision_loss)]
        let average_rating = if products.is_empty() {
            0.0
        } else {
            rating_sum / products.len() as f64
        };
        let category_breakdown = Category::ALL
            .into_iter()
            .map(|category| CategoryCount {
                category,
                label: category.label(),
                count: products.iter().filter(|p| p.category == category).count(),
            })
            .collect();

        Self {
            total_products: products.len(),
            total_value,
            average_rating,
            total_reviews: products.iter().map(|p| u64::from(p.reviews)).sum(),
            category_breakdown,
        }
    }
}
