//! Catalog records served by the remote API and the forms that edit them.
//!
//! Records are read-only from the shop's point of view: only the API mutates
//! them. The `*Input` types are what the admin forms submit; they validate
//! locally before anything is sent.

use serde::{Deserialize, Serialize};

use crate::{BrandId, CategoryId, Price, ProductId};

/// Products with fewer units than this show an "Only N left" badge.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// A product as returned by `GET /api/products` and friends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Primary image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Additional gallery images, when the API provides them.
    #[serde(default)]
    pub images: Option<Vec<String>>,
    pub price: Price,
    #[serde(default)]
    pub stock: i32,
    pub category_id: CategoryId,
    pub brand_id: BrandId,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub brand_name: Option<String>,
}

impl Product {
    /// Images for the detail gallery: the explicit list if non-empty,
    /// otherwise the primary image on its own.
    #[must_use]
    pub fn gallery(&self) -> Vec<&str> {
        match self.images.as_deref() {
            Some(images) if !images.is_empty() => images.iter().map(String::as_str).collect(),
            _ => self.image.as_deref().into_iter().collect(),
        }
    }

    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.stock < LOW_STOCK_THRESHOLD
    }

    #[must_use]
    pub fn category_label(&self) -> &str {
        self.category_name.as_deref().unwrap_or("")
    }

    #[must_use]
    pub fn brand_label(&self) -> &str {
        self.brand_name.as_deref().unwrap_or("")
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// =============================================================================
// Validation
// =============================================================================

/// One failed form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All field errors for a submitted form.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.summary())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record an error against `field`.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// First message recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Local validation run before a form is sent to the API.
pub trait Validate {
    /// # Errors
    ///
    /// Returns every field that failed.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

// =============================================================================
// Admin form inputs
// =============================================================================

/// Body of `POST /api/products` and `PUT /api/products/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub image: String,
    pub price: Price,
    pub stock: i32,
    pub category_id: CategoryId,
    pub brand_id: BrandId,
}

impl ProductInput {
    /// Prefill an edit form from an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            image: product.image.clone().unwrap_or_default(),
            price: product.price,
            stock: product.stock,
            category_id: product.category_id,
            brand_id: product.brand_id,
        }
    }
}

impl Validate for ProductInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Product name is required");
        }
        if !self.price.is_positive() {
            errors.add("price", "Price must be greater than 0");
        }
        if self.stock < 0 {
            errors.add("stock", "Stock cannot be negative");
        }
        errors.into_result()
    }
}

/// Body of the category create/update calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryInput {
    pub name: String,
    pub description: String,
}

impl From<&Category> for CategoryInput {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
        }
    }
}

impl Validate for CategoryInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Category name is required");
        }
        errors.into_result()
    }
}

/// Body of the brand create/update calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BrandInput {
    pub name: String,
    pub description: String,
}

impl From<&Brand> for BrandInput {
    fn from(brand: &Brand) -> Self {
        Self {
            name: brand.name.clone(),
            description: brand.description.clone().unwrap_or_default(),
        }
    }
}

impl Validate for BrandInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Brand name is required");
        }
        errors.into_result()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn input() -> ProductInput {
        ProductInput {
            name: "Elite Game Ball".to_string(),
            description: String::new(),
            image: String::new(),
            price: Price::from_cents(5999),
            stock: 3,
            category_id: CategoryId::new(1),
            brand_id: BrandId::new(1),
        }
    }

    #[test]
    fn test_product_from_api_json() {
        let json = r#"{
            "id": 3,
            "name": "Air Court 5",
            "description": null,
            "image": "https://cdn.example.com/ac5.png",
            "price": "149.90",
            "stock": 4,
            "category_id": 2,
            "brand_id": 1,
            "category_name": "Shoes",
            "brand_name": "Nike"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(3));
        assert_eq!(product.price, Price::new(Decimal::new(14_990, 2)));
        assert!(product.is_low_stock());
        assert_eq!(product.gallery(), vec!["https://cdn.example.com/ac5.png"]);
        assert_eq!(product.brand_label(), "Nike");
    }

    #[test]
    fn test_gallery_prefers_image_list() {
        let json = r#"{"id":1,"name":"Hoodie","price":40,"stock":50,
            "category_id":1,"brand_id":1,"image":"a.png","images":["b.png","c.png"]}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.gallery(), vec!["b.png", "c.png"]);
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_gallery_empty_list_falls_back() {
        let json = r#"{"id":1,"name":"Hoodie","price":40,
            "category_id":1,"brand_id":1,"image":"a.png","images":[]}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.gallery(), vec!["a.png"]);
    }

    #[test]
    fn test_valid_product_input() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn test_product_input_collects_all_errors() {
        let bad = ProductInput {
            name: "   ".to_string(),
            price: Price::ZERO,
            stock: -1,
            ..input()
        };
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("Product name is required"));
        assert_eq!(errors.get("price"), Some("Price must be greater than 0"));
        assert_eq!(errors.get("stock"), Some("Stock cannot be negative"));
        assert_eq!(errors.iter().count(), 3);
    }

    #[test]
    fn test_zero_stock_is_allowed() {
        let ok = ProductInput { stock: 0, ..input() };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_category_and_brand_require_name() {
        assert!(CategoryInput::default().validate().is_err());
        assert!(BrandInput::default().validate().is_err());
        let named = BrandInput {
            name: "Spalding".to_string(),
            description: String::new(),
        };
        assert!(named.validate().is_ok());
    }

    #[test]
    fn test_validation_errors_display() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Product name is required");
        errors.add("stock", "Stock cannot be negative");
        assert_eq!(
            errors.to_string(),
            "Product name is required; Stock cannot be negative"
        );
    }
}
