//! In-process stand-in for the hosted shop API.
//!
//! Serves the same `/api/...` routes over real HTTP, keeps its records in
//! memory and logs every call so tests can assert what the storefront sent.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::json;

use hoopshop_core::{
    Brand, BrandId, CartLine, Category, CategoryId, Price, Product, ProductId, Role, User, UserId,
};

/// Seeded shopper account.
pub const USER_EMAIL: &str = "jordan@hoopshop.test";
pub const USER_PASSWORD: &str = "secret123";
pub const USER_ID: i64 = 2;

/// Seeded admin account.
pub const ADMIN_EMAIL: &str = "admin@hoopshop.test";
pub const ADMIN_PASSWORD: &str = "admin123";

#[derive(Default)]
struct MockData {
    products: Vec<Product>,
    categories: Vec<Category>,
    brands: Vec<Brand>,
    users: Vec<(User, String)>,
    carts: HashMap<i64, Vec<(ProductId, u32)>>,
    calls: Vec<String>,
    next_id: i64,
    fail_cart: bool,
    reject_catalog: bool,
}

impl MockData {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn category_name(&self, id: CategoryId) -> Option<String> {
        self.categories.iter().find(|c| c.id == id).map(|c| c.name.clone())
    }

    fn brand_name(&self, id: BrandId) -> Option<String> {
        self.brands.iter().find(|b| b.id == id).map(|b| b.name.clone())
    }

    fn product(&self, id: i64, body: ProductBody) -> Product {
        Product {
            id: ProductId::new(id),
            name: body.name,
            description: Some(body.description).filter(|d| !d.is_empty()),
            image: Some(body.image).filter(|i| !i.is_empty()),
            images: None,
            price: body.price,
            stock: body.stock,
            category_name: self.category_name(body.category_id),
            brand_name: self.brand_name(body.brand_id),
            category_id: body.category_id,
            brand_id: body.brand_id,
        }
    }
}

/// Handle to the mock API; clones share state.
#[derive(Clone, Default)]
pub struct MockApi {
    data: Arc<Mutex<MockData>>,
}

impl MockApi {
    /// A catalog of two categories, two brands and two products, plus one
    /// shopper and one admin.
    #[must_use]
    pub fn seeded() -> Self {
        let mock = Self::default();
        {
            let mut data = mock.lock();
            data.categories = vec![
                Category {
                    id: CategoryId::new(1),
                    name: "Balls".to_string(),
                    description: None,
                },
                Category {
                    id: CategoryId::new(2),
                    name: "Shoes".to_string(),
                    description: None,
                },
            ];
            data.brands = vec![
                Brand {
                    id: BrandId::new(1),
                    name: "Spalding".to_string(),
                    description: None,
                },
                Brand {
                    id: BrandId::new(2),
                    name: "Nike".to_string(),
                    description: None,
                },
            ];
            data.products = vec![
                product(1, "Street Ball", 2999, 50, (1, "Balls"), (1, "Spalding")),
                product(2, "Court Shoes", 11999, 5, (2, "Shoes"), (2, "Nike")),
            ];
            data.users = vec![
                (
                    User {
                        id: UserId::new(1),
                        name: "Admin".to_string(),
                        email: ADMIN_EMAIL.to_string(),
                        role: Role::Admin,
                    },
                    ADMIN_PASSWORD.to_string(),
                ),
                (
                    User {
                        id: UserId::new(USER_ID),
                        name: "Jordan".to_string(),
                        email: USER_EMAIL.to_string(),
                        role: Role::User,
                    },
                    USER_PASSWORD.to_string(),
                ),
            ];
            data.next_id = 100;
        }
        mock
    }

    fn lock(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().expect("mock API state poisoned")
    }

    /// Serve on an ephemeral port.
    pub async fn serve(self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock API");
        let addr = listener.local_addr().expect("Mock API has no address");
        let router = self.router();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Mock API stopped");
        });
        addr
    }

    fn router(self) -> Router {
        Router::new()
            .route("/api/products", get(list_products).post(create_product))
            .route(
                "/api/products/{id}",
                get(get_product).put(update_product).delete(delete_product),
            )
            .route("/api/categories", get(list_categories).post(create_category))
            .route(
                "/api/categories/{id}",
                put(update_category).delete(delete_category),
            )
            .route("/api/brands", get(list_brands).post(create_brand))
            .route("/api/brands/{id}", put(update_brand).delete(delete_brand))
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/cart/view", get(view_cart))
            .route("/api/cart/add", post(cart_add))
            .route("/api/cart/update-quantity", put(cart_update))
            .route("/api/cart/remove", axum::routing::delete(cart_remove))
            .layer(from_fn_with_state(self.clone(), record))
            .with_state(self)
    }

    /// Every call so far, as `"METHOD /path"`.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// How many times `"METHOD /path"` was called.
    #[must_use]
    pub fn call_count(&self, call: &str) -> usize {
        self.lock().calls.iter().filter(|c| *c == call).count()
    }

    /// Make cart mutations answer 500.
    pub fn fail_cart(&self, fail: bool) {
        self.lock().fail_cart = fail;
    }

    /// Make catalog mutations answer 409 with a message.
    pub fn reject_catalog(&self, reject: bool) {
        self.lock().reject_catalog = reject;
    }

    /// Quantity of `product_id` in the server-side cart.
    #[must_use]
    pub fn cart_quantity(&self, user_id: i64, product_id: i64) -> Option<u32> {
        self.lock()
            .carts
            .get(&user_id)
            .and_then(|lines| lines.iter().find(|(p, _)| p.as_i64() == product_id))
            .map(|(_, q)| *q)
    }

    /// Number of lines in the server-side cart.
    #[must_use]
    pub fn cart_len(&self, user_id: i64) -> usize {
        self.lock().carts.get(&user_id).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn category_names(&self) -> Vec<String> {
        self.lock().categories.iter().map(|c| c.name.clone()).collect()
    }
}

fn product(
    id: i64,
    name: &str,
    cents: i64,
    stock: i32,
    category: (i64, &str),
    brand: (i64, &str),
) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: Some(format!("{name} for indoor and outdoor courts")),
        image: Some(format!("https://img.hoopshop.test/{id}.jpg")),
        images: None,
        price: Price::from_cents(cents),
        stock,
        category_id: CategoryId::new(category.0),
        brand_id: BrandId::new(brand.0),
        category_name: Some(category.1.to_string()),
        brand_name: Some(brand.1.to_string()),
    }
}

async fn record(State(mock): State<MockApi>, request: Request, next: Next) -> Response {
    mock.lock()
        .calls
        .push(format!("{} {}", request.method(), request.uri().path()));
    next.run(request).await
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

fn ok(text: &str) -> Response {
    message(StatusCode::OK, text)
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Deserialize)]
struct ProductBody {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
    price: Price,
    stock: i32,
    category_id: CategoryId,
    brand_id: BrandId,
}

#[derive(Deserialize)]
struct NameBody {
    name: String,
    #[serde(default)]
    description: String,
}

impl NameBody {
    fn description(&self) -> Option<String> {
        Some(self.description.clone()).filter(|d| !d.is_empty())
    }
}

fn rejected(data: &MockData) -> Option<Response> {
    data.reject_catalog
        .then(|| message(StatusCode::CONFLICT, "Name already exists"))
}

async fn list_products(State(mock): State<MockApi>) -> Json<Vec<Product>> {
    Json(mock.lock().products.clone())
}

async fn get_product(State(mock): State<MockApi>, Path(id): Path<i64>) -> Response {
    mock.lock()
        .products
        .iter()
        .find(|p| p.id.as_i64() == id)
        .map_or_else(
            || message(StatusCode::NOT_FOUND, "Product not found"),
            |p| Json(p.clone()).into_response(),
        )
}

async fn create_product(State(mock): State<MockApi>, Json(body): Json<ProductBody>) -> Response {
    let mut data = mock.lock();
    if let Some(resp) = rejected(&data) {
        return resp;
    }
    let id = data.next_id();
    let product = data.product(id, body);
    data.products.push(product);
    ok("Product created")
}

async fn update_product(
    State(mock): State<MockApi>,
    Path(id): Path<i64>,
    Json(body): Json<ProductBody>,
) -> Response {
    let mut data = mock.lock();
    if let Some(resp) = rejected(&data) {
        return resp;
    }
    let updated = data.product(id, body);
    match data.products.iter_mut().find(|p| p.id.as_i64() == id) {
        Some(existing) => {
            *existing = updated;
            ok("Product updated")
        }
        None => message(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn delete_product(State(mock): State<MockApi>, Path(id): Path<i64>) -> Response {
    mock.lock().products.retain(|p| p.id.as_i64() != id);
    ok("Product deleted")
}

async fn list_categories(State(mock): State<MockApi>) -> Json<Vec<Category>> {
    Json(mock.lock().categories.clone())
}

async fn create_category(State(mock): State<MockApi>, Json(body): Json<NameBody>) -> Response {
    let mut data = mock.lock();
    if let Some(resp) = rejected(&data) {
        return resp;
    }
    let id = data.next_id();
    data.categories.push(Category {
        id: CategoryId::new(id),
        description: body.description(),
        name: body.name,
    });
    ok("Category created")
}

async fn update_category(
    State(mock): State<MockApi>,
    Path(id): Path<i64>,
    Json(body): Json<NameBody>,
) -> Response {
    let mut data = mock.lock();
    if let Some(resp) = rejected(&data) {
        return resp;
    }
    if let Some(c) = data.categories.iter_mut().find(|c| c.id.as_i64() == id) {
        c.description = body.description();
        c.name = body.name;
    }
    ok("Category updated")
}

async fn delete_category(State(mock): State<MockApi>, Path(id): Path<i64>) -> Response {
    mock.lock().categories.retain(|c| c.id.as_i64() != id);
    ok("Category deleted")
}

async fn list_brands(State(mock): State<MockApi>) -> Json<Vec<Brand>> {
    Json(mock.lock().brands.clone())
}

async fn create_brand(State(mock): State<MockApi>, Json(body): Json<NameBody>) -> Response {
    let mut data = mock.lock();
    if let Some(resp) = rejected(&data) {
        return resp;
    }
    let id = data.next_id();
    data.brands.push(Brand {
        id: BrandId::new(id),
        description: body.description(),
        name: body.name,
    });
    ok("Brand created")
}

async fn update_brand(
    State(mock): State<MockApi>,
    Path(id): Path<i64>,
    Json(body): Json<NameBody>,
) -> Response {
    let mut data = mock.lock();
    if let Some(resp) = rejected(&data) {
        return resp;
    }
    if let Some(b) = data.brands.iter_mut().find(|b| b.id.as_i64() == id) {
        b.description = body.description();
        b.name = body.name;
    }
    ok("Brand updated")
}

async fn delete_brand(State(mock): State<MockApi>, Path(id): Path<i64>) -> Response {
    mock.lock().brands.retain(|b| b.id.as_i64() != id);
    ok("Brand deleted")
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Deserialize)]
struct Credentials {
    #[serde(default)]
    name: String,
    email: String,
    password: String,
}

async fn login(State(mock): State<MockApi>, Json(body): Json<Credentials>) -> Response {
    let data = mock.lock();
    match data
        .users
        .iter()
        .find(|(u, p)| u.email == body.email && *p == body.password)
    {
        Some((user, _)) => Json(json!({
            "token": format!("token-{}", user.id),
            "user": user,
            "message": "Login successful",
        }))
        .into_response(),
        None => message(StatusCode::UNAUTHORIZED, "Invalid email or password"),
    }
}

async fn register(State(mock): State<MockApi>, Json(body): Json<Credentials>) -> Response {
    let mut data = mock.lock();
    if data.users.iter().any(|(u, _)| u.email == body.email) {
        return message(StatusCode::BAD_REQUEST, "Email already registered");
    }
    let id = data.next_id();
    data.users.push((
        User {
            id: UserId::new(id),
            name: body.name,
            email: body.email,
            role: Role::User,
        },
        body.password,
    ));
    ok("User registered")
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartBody {
    user_id: UserId,
    product_id: ProductId,
    #[serde(default)]
    quantity: Option<u32>,
}

fn cart_failure(data: &MockData) -> Option<Response> {
    data.fail_cart
        .then(|| message(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable"))
}

async fn view_cart(
    State(mock): State<MockApi>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let Some(user_id) = query.get("userId").and_then(|id| id.parse::<i64>().ok()) else {
        return message(StatusCode::BAD_REQUEST, "userId is required");
    };
    let data = mock.lock();
    let lines: Vec<CartLine> = data
        .carts
        .get(&user_id)
        .into_iter()
        .flatten()
        .filter_map(|(pid, qty)| {
            data.products
                .iter()
                .find(|p| p.id == *pid)
                .map(|p| CartLine::new(p.clone(), *qty))
        })
        .collect();
    Json(lines).into_response()
}

async fn cart_add(State(mock): State<MockApi>, Json(body): Json<CartBody>) -> Response {
    let mut data = mock.lock();
    if let Some(resp) = cart_failure(&data) {
        return resp;
    }
    let quantity = body.quantity.unwrap_or(1);
    let lines = data.carts.entry(body.user_id.as_i64()).or_default();
    match lines.iter_mut().find(|(p, _)| *p == body.product_id) {
        Some((_, q)) => *q += quantity,
        None => lines.push((body.product_id, quantity)),
    }
    ok("Added to cart")
}

async fn cart_update(State(mock): State<MockApi>, Json(body): Json<CartBody>) -> Response {
    let mut data = mock.lock();
    if let Some(resp) = cart_failure(&data) {
        return resp;
    }
    let lines = data.carts.entry(body.user_id.as_i64()).or_default();
    if let Some((_, q)) = lines.iter_mut().find(|(p, _)| *p == body.product_id) {
        *q = body.quantity.unwrap_or(*q);
    }
    ok("Cart updated")
}

async fn cart_remove(State(mock): State<MockApi>, Json(body): Json<CartBody>) -> Response {
    let mut data = mock.lock();
    if let Some(resp) = cart_failure(&data) {
        return resp;
    }
    if let Some(lines) = data.carts.get_mut(&body.user_id.as_i64()) {
        lines.retain(|(p, _)| *p != body.product_id);
    }
    ok("Removed from cart")
}
