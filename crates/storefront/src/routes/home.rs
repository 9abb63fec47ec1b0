//! Root route.

use axum::response::Redirect;

use hoopshop_core::paths;

/// `/` has no page of its own; the catalog is the landing page.
pub async fn home() -> Redirect {
    Redirect::to(paths::PRODUCT_LIST)
}
