//! Shop API client implementation.
//!
//! Uses `reqwest` for HTTP and caches catalog lists with `moka`.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use hoopshop_core::{
    Brand, BrandId, BrandInput, CartLine, Category, CategoryId, CategoryInput, Product, ProductId,
    ProductInput, UserId,
};

use super::ApiError;
use super::cache::{CacheKey, CacheValue, Cacheable};
use super::types::{AuthResponse, CartItemRequest, ErrorBody, LoginRequest, RegisterRequest};
use crate::config::ApiConfig;

const CACHE_CAPACITY: u64 = 1000;

/// How much of an unexpected response body to keep in logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the shop REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built (TLS backend failure).
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("hoopshop-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Resolve an `/api/...` path against the configured origin.
    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.inner.client.request(method, self.url(path)?))
    }

    /// Send a request and decode a JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<T, ApiError> {
        let body = self.execute_raw(request, resource).await?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                resource,
                body = %truncate(&body),
                "Failed to parse shop API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request and return the body text, mapping error statuses.
    async fn execute_raw(&self, request: RequestBuilder, resource: &str) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(resource.to_string()));
        }

        if !status.is_success() {
            let message = ErrorBody::message_from(&body);
            if status.is_server_error() {
                tracing::error!(
                    status = %status,
                    resource,
                    body = %truncate(&body),
                    "Shop API returned server error"
                );
            } else {
                debug!(status = %status, resource, ?message, "Shop API rejected request");
            }
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    /// Send a mutation whose response body is not needed.
    async fn execute_mutation<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let mut request = self.request(method, path)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute_raw(request, path).await.map(|_| ())
    }

    /// Read-through cache lookup for a GET endpoint.
    async fn get_cached<T>(&self, key: CacheKey, path: &str) -> Result<T, ApiError>
    where
        T: Cacheable + Clone + DeserializeOwned,
    {
        if let Some(hit) = self.inner.cache.get(&key).await.and_then(T::from_value) {
            debug!(%key, "Cache hit");
            return Ok(hit);
        }

        let fresh: T = self
            .execute(self.request(Method::GET, path)?, &key.to_string())
            .await?;
        self.inner.cache.insert(key, fresh.clone().into_value()).await;
        Ok(fresh)
    }

    /// Drop cached entries so the next read refetches.
    async fn invalidate(&self, keys: &[CacheKey]) {
        for key in keys {
            debug!(%key, "Invalidating cache");
            self.inner.cache.invalidate(key).await;
        }
    }

    /// Uncached round trip used by the readiness check.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let request = self.request(Method::GET, "/api/categories")?;
        self.execute_raw(request, "ping").await.map(|_| ())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List every product.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get_cached(CacheKey::Products, "/api/products").await
    }

    /// Get one product by id.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.get_cached(CacheKey::Product(id), &format!("/api/products/{id}"))
            .await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<(), ApiError> {
        self.execute_mutation(Method::POST, "/api/products", Some(input))
            .await?;
        self.invalidate(&[CacheKey::Products]).await;
        Ok(())
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: ProductId, input: &ProductInput) -> Result<(), ApiError> {
        self.execute_mutation(Method::PUT, &format!("/api/products/{id}"), Some(input))
            .await?;
        self.invalidate(&[CacheKey::Products, CacheKey::Product(id)])
            .await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.execute_mutation::<()>(Method::DELETE, &format!("/api/products/{id}"), None)
            .await?;
        self.invalidate(&[CacheKey::Products, CacheKey::Product(id)])
            .await;
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get_cached(CacheKey::Categories, "/api/categories").await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(&self, input: &CategoryInput) -> Result<(), ApiError> {
        self.execute_mutation(Method::POST, "/api/categories", Some(input))
            .await?;
        self.invalidate(&[CacheKey::Categories]).await;
        Ok(())
    }

    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<(), ApiError> {
        self.execute_mutation(Method::PUT, &format!("/api/categories/{id}"), Some(input))
            .await?;
        // Product rows embed the category name.
        self.invalidate(&[CacheKey::Categories, CacheKey::Products])
            .await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), ApiError> {
        self.execute_mutation::<()>(Method::DELETE, &format!("/api/categories/{id}"), None)
            .await?;
        self.invalidate(&[CacheKey::Categories, CacheKey::Products])
            .await;
        Ok(())
    }

    // =========================================================================
    // Brands
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn list_brands(&self) -> Result<Vec<Brand>, ApiError> {
        self.get_cached(CacheKey::Brands, "/api/brands").await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_brand(&self, input: &BrandInput) -> Result<(), ApiError> {
        self.execute_mutation(Method::POST, "/api/brands", Some(input))
            .await?;
        self.invalidate(&[CacheKey::Brands]).await;
        Ok(())
    }

    #[instrument(skip(self, input))]
    pub async fn update_brand(&self, id: BrandId, input: &BrandInput) -> Result<(), ApiError> {
        self.execute_mutation(Method::PUT, &format!("/api/brands/{id}"), Some(input))
            .await?;
        self.invalidate(&[CacheKey::Brands, CacheKey::Products]).await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_brand(&self, id: BrandId) -> Result<(), ApiError> {
        self.execute_mutation::<()>(Method::DELETE, &format!("/api/brands/{id}"), None)
            .await?;
        self.invalidate(&[CacheKey::Brands, CacheKey::Products]).await;
        Ok(())
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a token and user record.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let request = self
            .request(Method::POST, "/api/auth/login")?
            .json(&LoginRequest { email, password });
        self.execute(request, "auth/login").await
    }

    /// Create an account.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let request = self
            .request(Method::POST, "/api/auth/register")?
            .json(&RegisterRequest {
                name,
                email,
                password,
            });
        self.execute(request, "auth/register").await
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the server-side cart for a user.
    #[instrument(skip(self))]
    pub async fn view_cart(&self, user_id: UserId) -> Result<Vec<CartLine>, ApiError> {
        let mut url = self.url("/api/cart/view")?;
        url.query_pairs_mut()
            .append_pair("userId", &user_id.to_string());
        self.execute(self.inner.client.get(url), "cart/view").await
    }

    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let body = CartItemRequest {
            user_id,
            product_id,
            quantity: Some(quantity),
        };
        self.execute_mutation(Method::POST, "/api/cart/add", Some(&body))
            .await
    }

    #[instrument(skip(self))]
    pub async fn update_cart_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let body = CartItemRequest {
            user_id,
            product_id,
            quantity: Some(quantity),
        };
        self.execute_mutation(Method::PUT, "/api/cart/update-quantity", Some(&body))
            .await
    }

    #[instrument(skip(self))]
    pub async fn remove_from_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        let body = CartItemRequest {
            user_id,
            product_id,
            quantity: None,
        };
        self.execute_mutation(Method::DELETE, "/api/cart/remove", Some(&body))
            .await
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(origin: &str) -> ApiClient {
        ApiClient::new(&ApiConfig::new(Url::parse(origin).unwrap())).unwrap()
    }

    #[test]
    fn test_url_joins_absolute_api_paths() {
        let api = client("https://thay-shop.onrender.com");
        assert_eq!(
            api.url("/api/products/3").unwrap().as_str(),
            "https://thay-shop.onrender.com/api/products/3"
        );
    }

    #[test]
    fn test_url_ignores_origin_path() {
        let api = client("http://127.0.0.1:4000/ignored/");
        assert_eq!(
            api.url("/api/brands").unwrap().as_str(),
            "http://127.0.0.1:4000/api/brands"
        );
    }

    #[test]
    fn test_truncate_limits_log_bodies() {
        let long = "x".repeat(LOG_BODY_LIMIT * 2);
        assert_eq!(truncate(&long).len(), LOG_BODY_LIMIT);
        assert_eq!(truncate("short"), "short");
    }

    #[tokio::test]
    async fn test_unreachable_api_is_http_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let api = client("http://127.0.0.1:9");
        let err = api.list_brands().await.unwrap_err();
        assert!(matches!(err, ApiError::Http(_)));
    }
}
