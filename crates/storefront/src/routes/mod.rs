//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                            - Redirect to the product listing
//!
//! # Catalog
//! GET  /user/product                - Product listing (search, category, brand)
//! GET  /user/productdetail/{id}     - Product detail
//!
//! # Cart (requires login)
//! GET  /user/cart                   - Cart page
//! POST /user/cart/add               - Add to cart (anonymous visitors go to login)
//! POST /user/cart/update            - Set a line's quantity
//! POST /user/cart/remove            - Remove a line
//! GET  /user/cart/count             - Cart count badge (fragment)
//! POST /user/cart/checkout          - Placeholder, redirects back with a notice
//!
//! # Auth
//! GET  /auth/login                  - Login page
//! POST /auth/login                  - Login action
//! GET  /auth/register               - Register page
//! POST /auth/register               - Register action
//! POST /auth/logout                 - Logout action
//!
//! # Admin (requires role admin)
//! GET  /admin/dashboard             - Panels: ?section=products|categories|brands
//! POST /admin/{resource}            - Create
//! POST /admin/{resource}/{id}       - Update
//! POST /admin/{resource}/{id}/delete - Delete
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use tower_sessions::Session;

use hoopshop_core::CartState;

use crate::middleware::{Flash, take_flash};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Message shown when a catalog or admin list cannot be fetched.
pub const LOAD_ERROR_MESSAGE: &str = "An error occurred while loading data";

/// Header data shared by every full page.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub user: Option<UserView>,
    pub cart_count: usize,
    pub flash: Option<Flash>,
}

/// Logged-in user as shown in the header.
#[derive(Debug, Clone)]
pub struct UserView {
    pub name: String,
    pub is_admin: bool,
}

impl From<&CurrentUser> for UserView {
    fn from(current: &CurrentUser) -> Self {
        Self {
            name: current.user.display_name().to_string(),
            is_admin: current.is_admin(),
        }
    }
}

impl PageContext {
    /// Build the header context, consuming any pending flash notice.
    pub async fn load(session: &Session, current: Option<&CurrentUser>) -> Self {
        let cart_count = if current.is_some() {
            session_cart(session).await.len()
        } else {
            0
        };

        Self {
            user: current.map(UserView::from),
            cart_count,
            flash: take_flash(session).await,
        }
    }
}

/// The session cart without touching the network. Read errors give an empty cart.
pub(crate) async fn session_cart(session: &Session) -> CartState {
    session
        .get::<CartState>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Accept only same-site relative paths as redirect targets.
///
/// Control characters are rejected outright: browsers drop tabs and newlines
/// from a `Location`, which can turn `/\t/host` into `//host`.
pub(crate) fn safe_return_path(candidate: Option<&str>, fallback: &str) -> String {
    match candidate {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => fallback.to_string(),
    }
}

/// Create the catalog and cart routes router (`/user`).
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/product", get(products::index))
        .route("/productdetail/{id}", get(products::show))
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/count", get(cart::count))
        .route("/cart/checkout", post(cart::checkout))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/products", post(admin::products::create))
        .route("/products/{id}", post(admin::products::update))
        .route("/products/{id}/delete", post(admin::products::delete))
        .route("/categories", post(admin::categories::create))
        .route("/categories/{id}", post(admin::categories::update))
        .route("/categories/{id}/delete", post(admin::categories::delete))
        .route("/brands", post(admin::brands::create))
        .route("/brands/{id}", post(admin::brands::update))
        .route("/brands/{id}/delete", post(admin::brands::delete))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/user", user_routes())
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_return_path() {
        assert_eq!(
            safe_return_path(Some("/user/product?search=ball"), "/x"),
            "/user/product?search=ball"
        );
        assert_eq!(safe_return_path(Some("//evil.example"), "/x"), "/x");
        assert_eq!(safe_return_path(Some("https://evil.example"), "/x"), "/x");
        assert_eq!(safe_return_path(Some("/\\evil"), "/x"), "/x");
        assert_eq!(safe_return_path(Some("/\t/evil.example"), "/x"), "/x");
        assert_eq!(safe_return_path(Some("/user/cart\r\nSet-Cookie: a=b"), "/x"), "/x");
        assert_eq!(safe_return_path(None, "/x"), "/x");
    }
}
