//! Page routes shared by redirects, templates and tests.

/// Storefront landing page and product grid.
pub const PRODUCT_LIST: &str = "/user/product";
/// Product detail page prefix; append the product id.
pub const PRODUCT_DETAIL: &str = "/user/productdetail";
/// Cart page.
pub const CART: &str = "/user/cart";
/// Login page.
pub const LOGIN: &str = "/auth/login";
/// Registration page.
pub const REGISTER: &str = "/auth/register";
/// Admin back-office landing page.
pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";

/// Detail page path for a product.
#[must_use]
pub fn product_detail(id: crate::ProductId) -> String {
    format!("{PRODUCT_DETAIL}/{id}")
}
