//! Cache types for shop API list responses.

use std::fmt;

use hoopshop_core::{Brand, Category, Product, ProductId};

/// Cache key, one per remote resource.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Product(ProductId),
    Categories,
    Brands,
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Products => f.write_str("products"),
            Self::Product(id) => write!(f, "products/{id}"),
            Self::Categories => f.write_str("categories"),
            Self::Brands => f.write_str("brands"),
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
    Categories(Vec<Category>),
    Brands(Vec<Brand>),
}

/// Conversion between a response type and its cache slot.
pub trait Cacheable: Sized {
    fn into_value(self) -> CacheValue;
    fn from_value(value: CacheValue) -> Option<Self>;
}

impl Cacheable for Vec<Product> {
    fn into_value(self) -> CacheValue {
        CacheValue::Products(self)
    }

    fn from_value(value: CacheValue) -> Option<Self> {
        match value {
            CacheValue::Products(v) => Some(v),
            _ => None,
        }
    }
}

impl Cacheable for Product {
    fn into_value(self) -> CacheValue {
        CacheValue::Product(Box::new(self))
    }

    fn from_value(value: CacheValue) -> Option<Self> {
        match value {
            CacheValue::Product(p) => Some(*p),
            _ => None,
        }
    }
}

impl Cacheable for Vec<Category> {
    fn into_value(self) -> CacheValue {
        CacheValue::Categories(self)
    }

    fn from_value(value: CacheValue) -> Option<Self> {
        match value {
            CacheValue::Categories(v) => Some(v),
            _ => None,
        }
    }
}

impl Cacheable for Vec<Brand> {
    fn into_value(self) -> CacheValue {
        CacheValue::Brands(self)
    }

    fn from_value(value: CacheValue) -> Option<Self> {
        match value {
            CacheValue::Brands(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display_is_resource_name() {
        assert_eq!(CacheKey::Products.to_string(), "products");
        assert_eq!(CacheKey::Product(ProductId::new(4)).to_string(), "products/4");
        assert_eq!(CacheKey::Categories.to_string(), "categories");
        assert_eq!(CacheKey::Brands.to_string(), "brands");
    }

    #[test]
    fn test_mismatched_slot_is_a_miss() {
        let value = Vec::<Brand>::new().into_value();
        assert!(Vec::<Category>::from_value(value).is_none());
    }
}
