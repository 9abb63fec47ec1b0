//! Integration tests for HoopShop.
//!
//! Each test boots the real storefront router on an ephemeral port, pointed at
//! an in-process [`MockApi`] instead of the hosted shop API. Requests go over
//! real HTTP with a cookie-keeping client, so sessions behave as in a browser.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p hoopshop-integration-tests
//! ```

pub mod mock_api;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use reqwest::{Client, Response, redirect::Policy};
use url::Url;

use hoopshop_storefront::{
    app,
    config::{ApiConfig, SentryConfig, StorefrontConfig},
    state::AppState,
};

pub use mock_api::{ADMIN_EMAIL, ADMIN_PASSWORD, MockApi, USER_EMAIL, USER_ID, USER_PASSWORD};

/// A running storefront and the mock API behind it.
pub struct TestApp {
    pub address: SocketAddr,
    pub client: Client,
    pub mock: MockApi,
}

impl TestApp {
    /// Start the mock API and a storefront wired to it.
    pub async fn spawn() -> Self {
        let mock = MockApi::seeded();
        let api_addr = mock.clone().serve().await;
        let api_url = Url::parse(&format!("http://{api_addr}")).expect("Invalid mock API URL");

        let config = StorefrontConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            api: ApiConfig::new(api_url),
            sentry: SentryConfig::default(),
        };
        let state = AppState::new(config).expect("Failed to build app state");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind storefront");
        let address = listener.local_addr().expect("Storefront has no address");
        tokio::spawn(async move {
            axum::serve(listener, app(state))
                .await
                .expect("Storefront stopped");
        });

        Self {
            address,
            client: browser(),
            mock,
        }
    }

    /// A second visitor on the same storefront, with its own cookie jar.
    #[must_use]
    pub fn another_browser(&self) -> Self {
        Self {
            address: self.address,
            client: browser(),
            mock: self.mock.clone(),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.address)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST failed")
    }

    /// Submit the login form.
    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.post_form("/auth/login", &[("email", email), ("password", password)])
            .await
    }

    pub async fn login_as_user(&self) -> Response {
        self.login(USER_EMAIL, USER_PASSWORD).await
    }

    pub async fn login_as_admin(&self) -> Response {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Body text of a GET.
    pub async fn page(&self, path: &str) -> String {
        self.get(path).await.text().await.expect("Failed to read body")
    }
}

/// Cookie-keeping client. Redirects are asserted, not followed.
fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
