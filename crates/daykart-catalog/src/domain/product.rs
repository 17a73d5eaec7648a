//! Product model, drafts and partial updates.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use daykart_core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize};

/// Closed set of storefront categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Mattresses, frames and bedding.
    Beds,
    /// Pens, paper and desk supplies.
    Stationary,
    /// Bathroom fittings.
    Bathware,
    /// Compact furniture and dorm essentials.
    Dorm,
    /// Newly launched collections.
    NewCollections,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 5] = [
        Self::Beds,
        Self::Stationary,
        Self::Bathware,
        Self::Dorm,
        Self::NewCollections,
    ];

    /// The persisted slug, e.g. `new-collections`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beds => "beds",
            Self::Stationary => "stationary",
            Self::Bathware => "bathware",
            Self::Dorm => "dorm",
            Self::NewCollections => "new-collections",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Beds => "Beds",
            Self::Stationary => "Stationary",
            Self::Bathware => "Bathware",
            Self::Dorm => "Dorm",
            Self::NewCollections => "New Collections",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| DomainError::Validation(format!("unknown category: {s}")))
    }
}

/// A catalog product, persisted as camelCase JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Current price.
    pub price: f64,
    /// Price before discount, if discounted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    /// Primary image URL.
    pub image: String,
    /// Gallery image URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    /// Average rating, 0 to 5.
    pub rating: f64,
    /// Number of reviews.
    pub reviews: u32,
    /// Storefront category.
    pub category: Category,
    /// Feature bullet points.
    #[serde(default)]
    pub features: Vec<String>,
    /// Free-form specification table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<BTreeMap<String, String>>,
    /// Whether the product carries a "new" badge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
    /// Collection name, for grouped launches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Whether the product appears in the featured list.
    #[serde(default)]
    pub featured: bool,
}

/// A product that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Current price.
    pub price: f64,
    /// Price before discount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    /// Primary image URL.
    pub image: String,
    /// Gallery image URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    /// Average rating, 0 to 5.
    pub rating: f64,
    /// Number of reviews.
    pub reviews: u32,
    /// Storefront category.
    pub category: Category,
    /// Feature bullet points.
    #[serde(default)]
    pub features: Vec<String>,
    /// Free-form specification table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<BTreeMap<String, String>>,
    /// Whether the product carries a "new" badge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
    /// Collection name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Whether the product appears in the featured list.
    #[serde(default)]
    pub featured: bool,
}

impl ProductDraft {
    /// Creates a draft with the required fields and neutral defaults
    /// (rating 5, no reviews, not featured).
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        image: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
            original_price: None,
            image: image.into(),
            images: None,
            rating: 5.0,
            reviews: 0,
            category,
            features: Vec::new(),
            specifications: None,
            is_new: None,
            collection: None,
            featured: false,
        }
    }

    /// Checks the fields every product needs.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name, description or image is
    /// blank, the price is not a positive number, or the rating is outside
    /// 0 to 5.
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("name", &self.name)?;
        require_text("description", &self.description)?;
        require_text("image", &self.image)?;
        require_price("price", self.price)?;
        if let Some(original) = self.original_price {
            require_price("originalPrice", original)?;
        }
        require_rating(self.rating)
    }

    /// Drops blank gallery images and features. A non-positive original
    /// price or a blank collection is treated as absent.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.features.retain(|feature| !feature.trim().is_empty());
        if let Some(images) = self.images.as_mut() {
            images.retain(|image| !image.trim().is_empty());
        }
        if self.images.as_ref().is_some_and(Vec::is_empty) {
            self.images = None;
        }
        if self.original_price.is_some_and(|price| price <= 0.0) {
            self.original_price = None;
        }
        if self.collection.as_deref().is_some_and(|c| c.trim().is_empty()) {
            self.collection = None;
        }
        self
    }

    /// Assigns `id` and turns the draft into a product.
    #[must_use]
    pub fn into_product(self, id: u64) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            original_price: self.original_price,
            image: self.image,
            images: self.images,
            rating: self.rating,
            reviews: self.reviews,
            category: self.category,
            features: self.features,
            specifications: self.specifications,
            is_new: self.is_new,
            collection: self.collection,
            featured: self.featured,
        }
    }
}

/// A partial product update.
///
/// Absent fields are left untouched. Optional product fields use a nested
/// option: `Some(None)` (JSON `null`) clears the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// New or cleared original price.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_price: Option<Option<f64>>,
    /// New primary image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// New or cleared gallery.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub images: Option<Option<Vec<String>>>,
    /// New rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// New review count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,
    /// New category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Replacement feature list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    /// New or cleared specification table.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub specifications: Option<Option<BTreeMap<String, String>>>,
    /// New or cleared "new" badge.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_new: Option<Option<bool>>,
    /// New or cleared collection.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub collection: Option<Option<String>>,
    /// New featured flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

/// Maps a present JSON value, including `null`, to `Some(..)` so that an
/// explicit `null` can be told apart from a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ProductPatch {
    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Checks the fields the patch sets.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` under the same rules as
    /// `ProductDraft::validate`, applied only to fields that are present.
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(description) = &self.description {
            require_text("description", description)?;
        }
        if let Some(image) = &self.image {
            require_text("image", image)?;
        }
        if let Some(price) = self.price {
            require_price("price", price)?;
        }
        if let Some(Some(original)) = self.original_price {
            require_price("originalPrice", original)?;
        }
        if let Some(rating) = self.rating {
            require_rating(rating)?;
        }
        Ok(())
    }

    /// Shallow-merges the patch into `product`. The id never changes.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            product.description.clone_from(description);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(original_price) = self.original_price {
            product.original_price = original_price;
        }
        if let Some(image) = &self.image {
            product.image.clone_from(image);
        }
        if let Some(images) = &self.images {
            product.images.clone_from(images);
        }
        if let Some(rating) = self.rating {
            product.rating = rating;
        }
        if let Some(reviews) = self.reviews {
            product.reviews = reviews;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(features) = &self.features {
            product.features.clone_from(features);
        }
        if let Some(specifications) = &self.specifications {
            product.specifications.clone_from(specifications);
        }
        if let Some(is_new) = self.is_new {
            product.is_new = is_new;
        }
        if let Some(collection) = &self.collection {
            product.collection.clone_from(collection);
        }
        if let Some(featured) = self.featured {
            product.featured = featured;
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

fn require_price(field: &str, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DomainError::Validation(format!(
            "{field} must be a positive amount, got {value}"
        )));
    }
    Ok(())
}

fn require_rating(value: f64) -> Result<(), DomainError> {
    if !(0.0..=5.0).contains(&value) {
        return Err(DomainError::Validation(format!(
            "rating must be between 0 and 5, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lamp() -> ProductDraft {
        ProductDraft::new(
            "Desk Lamp",
            "Adjustable LED desk lamp.",
            49.0,
            "https://example.com/lamp.jpg",
            Category::Dorm,
        )
    }

    #[test]
    fn test_category_serializes_as_kebab_case_slug() {
        let json = serde_json::to_string(&Category::NewCollections).unwrap();

        assert_eq!(json, "\"new-collections\"");
        assert_eq!("new-collections".parse::<Category>().unwrap(), Category::NewCollections);
    }

    #[test]
    fn test_category_from_str_rejects_unknown_slug() {
        let result = "garden".parse::<Category>();

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_product_reads_original_camel_case_json() {
        // Arrange
        let raw = r#"{
            "id": 5,
            "name": "Smart Home Hub",
            "description": "Central control hub.",
            "price": 199,
            "originalPrice": 249,
            "image": "hub.jpg",
            "rating": 4.9,
            "reviews": 78,
            "category": "new-collections",
            "features": ["Voice Control"],
            "isNew": true,
            "collection": "Smart Home Essentials",
            "featured": true
        }"#;

        // Act
        let product: Product = serde_json::from_str(raw).unwrap();

        // Assert
        assert_eq!(product.id, 5);
        assert_eq!(product.original_price, Some(249.0));
        assert_eq!(product.category, Category::NewCollections);
        assert_eq!(product.is_new, Some(true));
        assert_eq!(product.collection.as_deref(), Some("Smart Home Essentials"));
        assert!(product.images.is_none());
    }

    #[test]
    fn test_product_omits_absent_optional_fields() {
        let product = lamp().into_product(7);

        let value = serde_json::to_value(&product).unwrap();

        assert_eq!(value["id"], 7);
        assert!(value.get("originalPrice").is_none());
        assert!(value.get("isNew").is_none());
        assert_eq!(value["featured"], false);
    }

    #[test]
    fn test_validate_accepts_complete_draft() {
        assert!(lamp().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let mut draft = lamp();
        draft.name = "   ".to_owned();

        let result = draft.validate();

        assert!(matches!(result, Err(DomainError::Validation(msg)) if msg.contains("name")));
    }

    #[test]
    fn test_validate_rejects_non_positive_price() {
        let mut draft = lamp();
        draft.price = 0.0;

        assert!(draft.validate().is_err());

        draft.price = f64::NAN;
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_rating_out_of_range() {
        let mut draft = lamp();
        draft.rating = 5.5;

        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_normalized_drops_blank_entries_and_zero_original_price() {
        // Arrange
        let mut draft = lamp();
        draft.features = vec!["Dimmable".to_owned(), "  ".to_owned()];
        draft.images = Some(vec![String::new()]);
        draft.original_price = Some(0.0);
        draft.collection = Some(String::new());

        // Act
        let draft = draft.normalized();

        // Assert
        assert_eq!(draft.features, vec!["Dimmable".to_owned()]);
        assert!(draft.images.is_none());
        assert!(draft.original_price.is_none());
        assert!(draft.collection.is_none());
    }

    #[test]
    fn test_patch_apply_overwrites_only_present_fields() {
        // Arrange
        let mut product = lamp().into_product(3);
        let patch = ProductPatch {
            price: Some(39.0),
            featured: Some(true),
            ..ProductPatch::default()
        };

        // Act
        patch.apply_to(&mut product);

        // Assert
        assert_eq!(product.id, 3);
        assert_eq!(product.name, "Desk Lamp");
        assert_eq!(product.price, 39.0);
        assert!(product.featured);
    }

    #[test]
    fn test_patch_null_clears_optional_field() {
        // Arrange
        let mut draft = lamp();
        draft.original_price = Some(59.0);
        draft.collection = Some("Study".to_owned());
        let mut product = draft.into_product(3);
        let patch: ProductPatch = serde_json::from_str(r#"{"originalPrice": null}"#).unwrap();

        // Act
        patch.apply_to(&mut product);

        // Assert
        assert_eq!(patch.original_price, Some(None));
        assert!(product.original_price.is_none());
        assert_eq!(product.collection.as_deref(), Some("Study"));
    }

    #[test]
    fn test_patch_serializes_cleared_field_as_null() {
        let patch = ProductPatch {
            collection: Some(None),
            ..ProductPatch::default()
        };

        let value = serde_json::to_value(&patch).unwrap();

        assert_eq!(value, serde_json::json!({ "collection": null }));
    }

    #[test]
    fn test_patch_is_empty_only_without_fields() {
        assert!(ProductPatch::default().is_empty());
        assert!(
            !ProductPatch {
                reviews: Some(1),
                ..ProductPatch::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn test_patch_validate_checks_present_fields_only() {
        let ok = ProductPatch {
            rating: Some(4.0),
            ..ProductPatch::default()
        };
        let bad = ProductPatch {
            price: Some(-1.0),
            ..ProductPatch::default()
        };

        assert!(ok.validate().is_ok());
        assert!(bad.validate().is_err());
    }
}
