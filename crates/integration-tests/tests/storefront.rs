//! Shopper flows: catalog, login, cart.

#![allow(clippy::unwrap_used)]

use hoopshop_integration_tests::{TestApp, USER_ID, location};
use reqwest::StatusCode;

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;
    let resp = app.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    assert_eq!(app.get("/health/ready").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_root_redirects_to_listing() {
    let app = TestApp::spawn().await;
    let resp = app.get("/").await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/user/product");
}

#[tokio::test]
async fn test_listing_filters_by_brand() {
    let app = TestApp::spawn().await;
    let body = app.page("/user/product?brand=Nike").await;
    assert!(body.contains("Court Shoes"));
    assert!(!body.contains("Street Ball"));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let app = TestApp::spawn().await;
    let resp = app.get("/user/productdetail/999").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.text().await.unwrap().contains("Product not found"));
}

#[tokio::test]
async fn test_anonymous_add_redirects_to_login_without_cart_call() {
    let app = TestApp::spawn().await;
    let resp = app
        .post_form("/user/cart/add", &[("product_id", "1"), ("quantity", "1")])
        .await;

    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/auth/login");
    assert_eq!(app.mock.call_count("POST /api/cart/add"), 0);
}

#[tokio::test]
async fn test_cart_requires_login() {
    let app = TestApp::spawn().await;
    let resp = app.get("/user/cart").await;
    assert_eq!(location(&resp), "/auth/login");
}

#[tokio::test]
async fn test_user_login_lands_on_listing() {
    let app = TestApp::spawn().await;
    let resp = app.login_as_user().await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/user/product");

    let body = app.page("/user/product").await;
    assert!(body.contains("Hi, Jordan"));
}

#[tokio::test]
async fn test_bad_credentials_show_server_message() {
    let app = TestApp::spawn().await;
    let resp = app.login("jordan@hoopshop.test", "wrong").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Invalid email or password"));
}

#[tokio::test]
async fn test_register_mismatch_never_calls_api() {
    let app = TestApp::spawn().await;
    let resp = app
        .post_form(
            "/auth/register",
            &[
                ("name", "Kai"),
                ("email", "kai@hoopshop.test"),
                ("password", "secret123"),
                ("confirm_password", "secret999"),
            ],
        )
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(app.mock.call_count("POST /api/auth/register"), 0);
}

#[tokio::test]
async fn test_register_without_token_goes_to_login() {
    let app = TestApp::spawn().await;
    let resp = app
        .post_form(
            "/auth/register",
            &[
                ("name", "Kai"),
                ("email", "kai@hoopshop.test"),
                ("password", "secret123"),
                ("confirm_password", "secret123"),
            ],
        )
        .await;

    assert_eq!(location(&resp), "/auth/login");
    let body = app.page("/auth/login").await;
    assert!(body.contains("Registration successful. Please log in."));
}

#[tokio::test]
async fn test_adding_twice_sums_quantities() {
    let app = TestApp::spawn().await;
    app.login_as_user().await;

    let resp = app
        .post_form("/user/cart/add", &[("product_id", "1"), ("quantity", "2")])
        .await;
    assert_eq!(location(&resp), "/user/product");
    app.post_form("/user/cart/add", &[("product_id", "1"), ("quantity", "1")])
        .await;

    assert_eq!(app.mock.cart_quantity(USER_ID, 1), Some(3));

    let body = app.page("/user/cart").await;
    assert!(body.contains("Street Ball"));
    assert!(body.contains(r#"value="3""#));
}

#[tokio::test]
async fn test_update_and_remove() {
    let app = TestApp::spawn().await;
    app.login_as_user().await;
    app.post_form("/user/cart/add", &[("product_id", "2")]).await;

    let resp = app
        .post_form("/user/cart/update", &[("product_id", "2"), ("quantity", "4")])
        .await;
    assert_eq!(location(&resp), "/user/cart");
    assert_eq!(app.mock.cart_quantity(USER_ID, 2), Some(4));

    app.post_form("/user/cart/remove", &[("product_id", "2")])
        .await;
    assert_eq!(app.mock.cart_len(USER_ID), 0);
    assert!(app.page("/user/cart").await.contains("Your cart is empty."));
}

#[tokio::test]
async fn test_zero_quantity_is_rejected() {
    let app = TestApp::spawn().await;
    app.login_as_user().await;
    app.post_form("/user/cart/add", &[("product_id", "1")]).await;

    let resp = app
        .post_form("/user/cart/update", &[("product_id", "1"), ("quantity", "0")])
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.mock.call_count("PUT /api/cart/update-quantity"), 0);
}

#[tokio::test]
async fn test_failed_add_rolls_back_session_cart() {
    let app = TestApp::spawn().await;
    app.login_as_user().await;
    app.post_form("/user/cart/add", &[("product_id", "1")]).await;
    assert!(app.page("/user/cart/count").await.contains("(1)"));

    app.mock.fail_cart(true);
    let resp = app
        .post_form(
            "/user/cart/add",
            &[("product_id", "2"), ("return_to", "/user/productdetail/2")],
        )
        .await;

    assert_eq!(location(&resp), "/user/productdetail/2");
    assert!(app.page("/user/cart/count").await.contains("(1)"));
    assert_eq!(app.mock.cart_len(USER_ID), 1);

    let body = app.page("/user/productdetail/2").await;
    assert!(body.contains("Could not update your cart. Please try again."));
}

#[tokio::test]
async fn test_htmx_add_returns_count_fragment() {
    let app = TestApp::spawn().await;
    app.login_as_user().await;

    let resp = app
        .client
        .post(app.url("/user/cart/add"))
        .header("hx-request", "true")
        .form(&[("product_id", "1")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["hx-trigger"], "cart-updated");
    assert!(resp.text().await.unwrap().contains("(1)"));

    // The badge is the feedback; no notice is left for a later page.
    assert!(!app.page("/user/cart").await.contains("added to cart"));
}

#[tokio::test]
async fn test_external_return_path_is_ignored() {
    let app = TestApp::spawn().await;
    app.login_as_user().await;
    for target in [
        "//evil.example/phish",
        "/\t/evil.example/phish",
        "/user/cart\r\nSet-Cookie: a=b",
    ] {
        let resp = app
            .post_form("/user/cart/add", &[("product_id", "1"), ("return_to", target)])
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "return_to {target:?}");
        assert_eq!(location(&resp), "/user/product", "return_to {target:?}");
    }
}

#[tokio::test]
async fn test_listing_sees_items_added_from_another_browser() {
    let laptop = TestApp::spawn().await;
    laptop.login_as_user().await;
    assert!(!laptop.page("/user/product").await.contains(">In cart</a>"));

    let phone = laptop.another_browser();
    phone.login_as_user().await;
    phone
        .post_form("/user/cart/add", &[("product_id", "1")])
        .await;
    assert_eq!(laptop.mock.cart_quantity(USER_ID, 1), Some(1));

    let body = laptop.page("/user/product").await;
    assert!(body.contains(">In cart</a>"));
    assert!(laptop.page("/user/cart/count").await.contains("(1)"));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let app = TestApp::spawn().await;
    app.login_as_user().await;
    app.post_form("/user/cart/add", &[("product_id", "1")]).await;

    let resp = app.post_form("/auth/logout", &[]).await;
    assert_eq!(location(&resp), "/");
    assert_eq!(location(&app.get("/user/cart").await), "/auth/login");
}
