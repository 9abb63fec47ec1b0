//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hoopshop_core::filter::{ALL_BRANDS, ALL_CATEGORIES, brand_options, category_options};
use hoopshop_core::{CartState, Product, ProductFilter, ProductId, paths};

use crate::api::ApiError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::{LOAD_ERROR_MESSAGE, PageContext};
use crate::services::CartService;
use crate::state::AppState;

/// Product card data for the listing.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub href: String,
    pub name: String,
    pub image: Option<String>,
    pub price: String,
    pub category: String,
    pub brand: String,
    pub stock_badge: StockBadge,
    pub in_cart: bool,
}

/// Stock indicator shown on cards and the detail page.
#[derive(Clone, PartialEq, Eq)]
pub enum StockBadge {
    InStock,
    Low(i32),
    Out,
}

impl StockBadge {
    fn for_product(product: &Product) -> Self {
        if product.stock <= 0 {
            Self::Out
        } else if product.is_low_stock() {
            Self::Low(product.stock)
        } else {
            Self::InStock
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::InStock => "In stock".to_string(),
            Self::Low(n) => format!("Only {n} left"),
            Self::Out => "Out of stock".to_string(),
        }
    }

    #[must_use]
    pub const fn css(&self) -> &'static str {
        match self {
            Self::InStock => "in-stock",
            Self::Low(_) => "low-stock",
            Self::Out => "out-of-stock",
        }
    }

    #[must_use]
    pub const fn is_out(&self) -> bool {
        matches!(self, Self::Out)
    }
}

impl ProductCardView {
    fn new(product: &Product, cart: Option<&CartState>) -> Self {
        Self {
            id: product.id.to_string(),
            href: paths::product_detail(product.id),
            name: product.name.clone(),
            image: product.gallery().first().map(|s| (*s).to_string()),
            price: product.price.to_string(),
            category: product.category_label().to_string(),
            brand: product.brand_label().to_string(),
            stock_badge: StockBadge::for_product(product),
            in_cart: cart.is_some_and(|c| c.contains(product.id)),
        }
    }
}

/// Dropdown option.
#[derive(Clone)]
pub struct OptionView {
    pub value: String,
    pub selected: bool,
}

fn options(all_label: &str, names: Vec<String>, selected: Option<&str>) -> Vec<OptionView> {
    let selected = selected.filter(|s| !s.is_empty()).unwrap_or(all_label);
    std::iter::once(all_label.to_string())
        .chain(names)
        .map(|value| OptionView {
            selected: value == selected,
            value,
        })
        .collect()
}

/// Listing filters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
}

impl ListingQuery {
    fn to_filter(&self) -> ProductFilter {
        ProductFilter {
            search: self.search.clone().unwrap_or_default(),
            category: self.category.clone(),
            brand: self.brand.clone(),
        }
    }

    /// The listing URL with these filters, used as the add-to-cart return path.
    fn return_path(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in [
            ("search", &self.search),
            ("category", &self.category),
            ("brand", &self.brand),
        ] {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                query.append_pair(key, v);
            }
        }
        let query = query.finish();
        if query.is_empty() {
            paths::PRODUCT_LIST.to_string()
        } else {
            format!("{}?{query}", paths::PRODUCT_LIST)
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub page: PageContext,
    pub products: Vec<ProductCardView>,
    pub total_count: usize,
    pub search: String,
    pub categories: Vec<OptionView>,
    pub brands: Vec<OptionView>,
    pub error: Option<String>,
    pub return_to: String,
}

/// Product detail display data.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub brand: String,
    pub images: Vec<String>,
    pub stock: i32,
    pub stock_badge: StockBadge,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price.to_string(),
            category: product.category_label().to_string(),
            brand: product.brand_label().to_string(),
            images: product.gallery().into_iter().map(String::from).collect(),
            stock: product.stock.max(0),
            stock_badge: StockBadge::for_product(product),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub product: ProductDetailView,
    pub in_cart: bool,
    pub return_to: String,
}

/// Shown when a product id does not exist or cannot be loaded.
#[derive(Template, WebTemplate)]
#[template(path = "products/not_found.html")]
pub struct ProductNotFoundTemplate {
    pub page: PageContext,
    pub message: String,
}

/// Display product listing page.
#[instrument(skip(state, session, current))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current): OptionalAuth,
    Query(query): Query<ListingQuery>,
) -> impl IntoResponse {
    let (products, error) = match state.api().list_products().await {
        Ok(products) => (products, None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch products");
            (Vec::new(), Some(LOAD_ERROR_MESSAGE.to_string()))
        }
    };

    let filter = query.to_filter();
    let shown = filter.apply(&products);

    let cart = match &current {
        Some(user) => {
            let ids: Vec<_> = shown.iter().map(|p| p.id).collect();
            Some(
                CartService::new(state.api(), &session)
                    .covering(user.id(), &ids)
                    .await,
            )
        }
        None => None,
    };

    let cards = shown
        .into_iter()
        .map(|p| ProductCardView::new(p, cart.as_ref()))
        .collect();

    ProductsIndexTemplate {
        page: PageContext::load(&session, current.as_ref()).await,
        products: cards,
        total_count: products.len(),
        search: filter.search,
        categories: options(
            ALL_CATEGORIES,
            category_options(&products),
            query.category.as_deref(),
        ),
        brands: options(ALL_BRANDS, brand_options(&products), query.brand.as_deref()),
        error,
        return_to: query.return_path(),
    }
}

/// Display product detail page.
#[instrument(skip(state, session, current))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current): OptionalAuth,
    Path(id): Path<ProductId>,
) -> Response {
    match state.api().get_product(id).await {
        Ok(product) => {
            let in_cart = match &current {
                Some(user) => {
                    CartService::new(state.api(), &session)
                        .is_in_cart(user.id(), id)
                        .await
                }
                None => false,
            };

            ProductShowTemplate {
                page: PageContext::load(&session, current.as_ref()).await,
                product: ProductDetailView::from(&product),
                in_cart,
                return_to: paths::product_detail(id),
            }
            .into_response()
        }
        Err(e) => {
            let (status, message) = match e {
                ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "Product not found".to_string()),
                other => {
                    tracing::error!(error = %other, %id, "Failed to fetch product");
                    (StatusCode::BAD_GATEWAY, LOAD_ERROR_MESSAGE.to_string())
                }
            };
            let template = ProductNotFoundTemplate {
                page: PageContext::load(&session, current.as_ref()).await,
                message,
            };
            (status, template).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use hoopshop_core::{BrandId, CategoryId, Price};

    use super::*;

    fn product(stock: i32) -> Product {
        Product {
            id: ProductId::new(5),
            name: "Court Shoe".to_string(),
            description: None,
            image: Some("shoe.jpg".to_string()),
            images: None,
            price: Price::from_cents(8999),
            stock,
            category_id: CategoryId::new(1),
            brand_id: BrandId::new(2),
            category_name: Some("Shoes".to_string()),
            brand_name: None,
        }
    }

    #[test]
    fn test_stock_badge() {
        assert_eq!(StockBadge::for_product(&product(50)).label(), "In stock");
        assert_eq!(StockBadge::for_product(&product(3)).label(), "Only 3 left");
        assert!(StockBadge::for_product(&product(0)).is_out());
    }

    #[test]
    fn test_card_in_cart_flag() {
        let mut cart = CartState::new();
        assert!(!ProductCardView::new(&product(5), Some(&cart)).in_cart);
        cart.add_item(product(5), 1);
        let card = ProductCardView::new(&product(5), Some(&cart));
        assert!(card.in_cart);
        assert_eq!(card.href, "/user/productdetail/5");
        assert_eq!(card.image.as_deref(), Some("shoe.jpg"));
        assert!(!ProductCardView::new(&product(5), None).in_cart);
    }

    #[test]
    fn test_options_select_all_by_default() {
        let opts = options(ALL_BRANDS, vec!["Nike".to_string()], None);
        assert_eq!(opts.len(), 2);
        assert!(opts[0].selected);
        assert!(!opts[1].selected);

        let opts = options(ALL_BRANDS, vec!["Nike".to_string()], Some("Nike"));
        assert!(opts[1].selected);
    }

    #[test]
    fn test_return_path_keeps_filters() {
        let query = ListingQuery {
            search: Some("ball".to_string()),
            category: None,
            brand: Some("Wilson Sporting".to_string()),
        };
        assert_eq!(
            query.return_path(),
            "/user/product?search=ball&brand=Wilson+Sporting"
        );
        assert_eq!(ListingQuery::default().return_path(), "/user/product");
    }
}
