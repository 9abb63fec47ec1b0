//! In-memory filtering of already-fetched lists.

use crate::{Brand, Category, Product};

/// Sentinel shown in the category dropdown meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All Categories";
/// Sentinel shown in the brand dropdown meaning "no brand filter".
pub const ALL_BRANDS: &str = "All Brands";

/// Anything with a display name that search can match against.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Product {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Brand {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Case-insensitive substring match. An empty (or all-blank) term matches everything.
#[must_use]
pub fn name_matches(name: &str, term: &str) -> bool {
    let term = term.trim();
    term.is_empty() || name.to_lowercase().contains(&term.to_lowercase())
}

/// Keep the items whose name contains `term`, ignoring case.
#[must_use]
pub fn filter_by_name<'a, T: Named>(items: &'a [T], term: &str) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| name_matches(item.name(), term))
        .collect()
}

/// Storefront product filter: search text plus exact category and brand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub search: String,
    /// `None` or [`ALL_CATEGORIES`] disables the category check.
    pub category: Option<String>,
    /// `None` or [`ALL_BRANDS`] disables the brand check.
    pub brand: Option<String>,
}

impl ProductFilter {
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = match self.category.as_deref() {
            None | Some(ALL_CATEGORIES | "") => true,
            Some(wanted) => product.category_name.as_deref() == Some(wanted),
        };
        let brand_ok = match self.brand.as_deref() {
            None | Some(ALL_BRANDS | "") => true,
            Some(wanted) => product.brand_name.as_deref() == Some(wanted),
        };
        category_ok && brand_ok && name_matches(&product.name, &self.search)
    }

    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct, sorted category names present in `products` (dropdown options).
#[must_use]
pub fn category_options(products: &[Product]) -> Vec<String> {
    distinct_sorted(products.iter().filter_map(|p| p.category_name.as_deref()))
}

/// Distinct, sorted brand names present in `products` (dropdown options).
#[must_use]
pub fn brand_options(products: &[Product]) -> Vec<String> {
    distinct_sorted(products.iter().filter_map(|p| p.brand_name.as_deref()))
}

fn distinct_sorted<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = names
        .filter(|n| !n.is_empty())
        .map(str::to_owned)
        .collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{BrandId, CategoryId, Price, ProductId};

    fn product(id: i64, name: &str, category: &str, brand: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: None,
            image: None,
            images: None,
            price: Price::from_cents(1000),
            stock: 5,
            category_id: CategoryId::new(1),
            brand_id: BrandId::new(1),
            category_name: Some(category.to_string()),
            brand_name: Some(brand.to_string()),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Air Zoom Guard", "Shoes", "Nike"),
            product(2, "Official Game Ball", "Balls", "Spalding"),
            product(3, "Zoom Freak 5", "Shoes", "Nike"),
            product(4, "Arm Sleeve", "Accessories", "Under Armour"),
        ]
    }

    fn category(name: &str) -> Category {
        Category {
            id: CategoryId::new(1),
            name: name.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_name_filter_is_case_insensitive_substring() {
        let categories = vec![category("Shoes"), category("Balls"), category("Shorts")];
        let hits = filter_by_name(&categories, "sHo");
        let names: Vec<&str> = hits.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Shoes", "Shorts"]);
    }

    #[test]
    fn test_empty_term_returns_everything() {
        let categories = vec![category("Shoes"), category("Balls")];
        assert_eq!(filter_by_name(&categories, "").len(), 2);
        assert_eq!(filter_by_name(&categories, "   ").len(), 2);
    }

    #[test]
    fn test_no_match() {
        let products = catalog();
        assert!(filter_by_name(&products, "jersey").is_empty());
    }

    #[test]
    fn test_product_filter_combines_all_criteria() {
        let products = catalog();
        let filter = ProductFilter {
            search: "zoom".to_string(),
            category: Some("Shoes".to_string()),
            brand: Some("Nike".to_string()),
        };
        let ids: Vec<i64> = filter.apply(&products).iter().map(|p| p.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_product_filter_sentinels_disable_checks() {
        let products = catalog();
        let filter = ProductFilter {
            search: String::new(),
            category: Some(ALL_CATEGORIES.to_string()),
            brand: Some(ALL_BRANDS.to_string()),
        };
        assert_eq!(filter.apply(&products).len(), products.len());
        assert_eq!(ProductFilter::default().apply(&products).len(), products.len());
    }

    #[test]
    fn test_product_filter_brand_is_exact() {
        let products = catalog();
        let filter = ProductFilter {
            brand: Some("nike".to_string()),
            ..ProductFilter::default()
        };
        assert!(filter.apply(&products).is_empty());
    }

    #[test]
    fn test_options_are_distinct_and_sorted() {
        let products = catalog();
        assert_eq!(category_options(&products), vec!["Accessories", "Balls", "Shoes"]);
        assert_eq!(brand_options(&products), vec!["Nike", "Spalding", "Under Armour"]);
    }
}
