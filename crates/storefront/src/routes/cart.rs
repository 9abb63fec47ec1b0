//! Cart route handlers.
//!
//! Mutations are form posts that redirect back (post/redirect/get). Requests
//! sent by HTMX get the cart count fragment instead, with a `cart-updated`
//! trigger so other elements can refresh.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hoopshop_core::{CartLine, CartState, CartTotals, ProductId, paths};

use crate::error::AppError;
use crate::filters;
use crate::middleware::{Flash, OptionalAuth, RequireAuth, set_flash};
use crate::routes::{LOAD_ERROR_MESSAGE, PageContext, safe_return_path, session_cart};
use crate::services::CartService;
use crate::state::AppState;

/// Notice shown when the API rejects a cart change.
const CART_UPDATE_FAILED: &str = "Could not update your cart. Please try again.";

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub href: String,
    pub name: String,
    pub image: Option<String>,
    pub price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id.to_string(),
            href: paths::product_detail(line.product.id),
            name: line.product.name.clone(),
            image: line.product.gallery().first().map(|s| (*s).to_string()),
            price: line.product.price.to_string(),
            quantity: line.quantity,
            line_total: line.line_total().to_string(),
        }
    }
}

/// Order summary display data.
#[derive(Clone)]
pub struct SummaryView {
    pub subtotal: String,
    /// `None` renders as "Free".
    pub shipping: Option<String>,
    pub tax: String,
    pub total: String,
    /// "Add $X more to get free shipping!" amount.
    pub free_shipping_gap: Option<String>,
}

impl From<CartTotals> for SummaryView {
    fn from(totals: CartTotals) -> Self {
        Self {
            subtotal: totals.subtotal.to_string(),
            shipping: (!totals.free_shipping()).then(|| totals.shipping.to_string()),
            tax: totals.tax.to_string(),
            total: totals.total.to_string(),
            free_shipping_gap: totals.amount_to_free_shipping().map(|p| p.to_string()),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub summary: SummaryView,
    pub item_count: u32,
}

impl From<&CartState> for CartView {
    fn from(cart: &CartState) -> Self {
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            summary: SummaryView::from(cart.totals()),
            item_count: cart.total_quantity(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<i64>,
    pub return_to: Option<String>,
}

/// Update cart form data.
///
/// Signed so that zero and negative submissions reach the range check.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub error: Option<String>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: usize,
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some_and(|v| v == "true")
}

/// Positive quantities only; the API and the cart never see anything else.
fn checked_quantity(raw: i64) -> Result<u32, AppError> {
    u32::try_from(raw)
        .ok()
        .filter(|q| *q >= 1)
        .ok_or_else(|| AppError::BadRequest("Quantity must be at least 1".to_string()))
}

/// Redirect back, or the count fragment for HTMX.
fn respond_after_change(headers: &HeaderMap, cart: &CartState, return_to: &str) -> Response {
    if is_htmx(headers) {
        (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate { count: cart.len() },
        )
            .into_response()
    } else {
        Redirect::to(return_to).into_response()
    }
}

/// Record a failed change for the next page and send the visitor back.
async fn respond_after_failure(session: &Session, headers: &HeaderMap, return_to: &str) -> Response {
    if let Err(e) = set_flash(session, Flash::error(CART_UPDATE_FAILED)).await {
        tracing::error!(error = %e, "Failed to store flash notice");
    }
    if is_htmx(headers) {
        (StatusCode::BAD_GATEWAY, CART_UPDATE_FAILED).into_response()
    } else {
        Redirect::to(return_to).into_response()
    }
}

/// Display cart page.
///
/// The session cart is replaced by the server's copy before rendering. If
/// that fetch fails the last known session cart is shown with an error.
#[instrument(skip(state, session, current), fields(user_id = %current.id()))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> impl IntoResponse {
    let service = CartService::new(state.api(), &session);
    let (cart, error) = match service.reconcile(current.id()).await {
        Ok(cart) => (cart, None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch cart");
            (
                session_cart(&session).await,
                Some(LOAD_ERROR_MESSAGE.to_string()),
            )
        }
    };

    CartShowTemplate {
        page: PageContext::load(&session, Some(&current)).await,
        cart: CartView::from(&cart),
        error,
    }
}

/// Add item to cart.
///
/// Anonymous visitors are sent to the login page and nothing is changed.
#[instrument(skip(state, session, current, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, AppError> {
    let Some(current) = current else {
        tracing::debug!(product_id = %form.product_id, "Anonymous add to cart");
        if is_htmx(&headers) {
            return Ok((AppendHeaders([("HX-Redirect", paths::LOGIN)]), StatusCode::OK).into_response());
        }
        return Ok(Redirect::to(paths::LOGIN).into_response());
    };

    let quantity = checked_quantity(form.quantity.unwrap_or(1))?;
    let return_to = safe_return_path(form.return_to.as_deref(), paths::PRODUCT_LIST);
    let product = state.api().get_product(form.product_id).await?;
    let name = product.name.clone();

    match CartService::new(state.api(), &session)
        .add(current.id(), product, quantity)
        .await
    {
        Ok(cart) => {
            // htmx swaps only the badge, so a flash would surface on a later page.
            if !is_htmx(&headers) {
                set_flash(&session, Flash::success(format!("{name} added to cart"))).await?;
            }
            Ok(respond_after_change(&headers, &cart, &return_to))
        }
        Err(AppError::Api(_)) => Ok(respond_after_failure(&session, &headers, &return_to).await),
        Err(e) => Err(e),
    }
}

/// Update cart item quantity.
#[instrument(skip(state, session, current, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response, AppError> {
    let quantity = checked_quantity(form.quantity)?;

    match CartService::new(state.api(), &session)
        .update(current.id(), form.product_id, quantity)
        .await
    {
        Ok(cart) => Ok(respond_after_change(&headers, &cart, paths::CART)),
        Err(AppError::Api(_)) => Ok(respond_after_failure(&session, &headers, paths::CART).await),
        Err(e) => Err(e),
    }
}

/// Remove item from cart.
#[instrument(skip(state, session, current, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response, AppError> {
    match CartService::new(state.api(), &session)
        .remove(current.id(), form.product_id)
        .await
    {
        Ok(cart) => Ok(respond_after_change(&headers, &cart, paths::CART)),
        Err(AppError::Api(_)) => Ok(respond_after_failure(&session, &headers, paths::CART).await),
        Err(e) => Err(e),
    }
}

/// Get cart count badge (number of lines in the session cart).
pub async fn count(session: Session, OptionalAuth(current): OptionalAuth) -> impl IntoResponse {
    let count = if current.is_some() {
        session_cart(&session).await.len()
    } else {
        0
    };
    CartCountTemplate { count }
}

/// Checkout is not offered; acknowledge and return to the cart.
pub async fn checkout(
    session: Session,
    RequireAuth(_current): RequireAuth,
) -> Result<Redirect, AppError> {
    set_flash(&session, Flash::error("Checkout is not available yet")).await?;
    Ok(Redirect::to(paths::CART))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;
    use hoopshop_core::{BrandId, CategoryId, Price, Product};

    use super::*;

    fn line(cents: i64, quantity: u32) -> CartLine {
        CartLine::new(
            Product {
                id: ProductId::new(1),
                name: "Game Ball".to_string(),
                description: None,
                image: None,
                images: Some(vec!["a.jpg".to_string(), "b.jpg".to_string()]),
                price: Price::from_cents(cents),
                stock: 12,
                category_id: CategoryId::new(1),
                brand_id: BrandId::new(1),
                category_name: None,
                brand_name: None,
            },
            quantity,
        )
    }

    #[test]
    fn test_checked_quantity() {
        assert_eq!(checked_quantity(3).unwrap(), 3);
        assert!(matches!(checked_quantity(0), Err(AppError::BadRequest(_))));
        assert!(checked_quantity(-2).is_err());
        assert!(checked_quantity(i64::MAX).is_err());
    }

    #[test]
    fn test_summary_free_shipping() {
        let cart = CartState::from_server(vec![line(6000, 2)]);
        let view = CartView::from(&cart);
        assert_eq!(view.summary.subtotal, "$120.00");
        assert_eq!(view.summary.shipping, None);
        assert_eq!(view.summary.tax, "$9.60");
        assert_eq!(view.summary.total, "$129.60");
        assert_eq!(view.summary.free_shipping_gap, None);
        assert_eq!(view.item_count, 2);
    }

    #[test]
    fn test_summary_flat_shipping_and_gap() {
        let cart = CartState::from_server(vec![line(4000, 2)]);
        let view = CartView::from(&cart);
        assert_eq!(view.summary.shipping.as_deref(), Some("$15.00"));
        assert_eq!(view.summary.free_shipping_gap.as_deref(), Some("$20.00"));
        assert_eq!(view.items[0].line_total, "$80.00");
        assert_eq!(view.items[0].image.as_deref(), Some("a.jpg"));
    }

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("hx-request", HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
    }
}
