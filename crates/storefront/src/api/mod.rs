//! Client for the hosted shop REST API.
//!
//! # Architecture
//!
//! - Plain JSON over HTTPS with `reqwest`
//! - The remote API is the source of truth - NO local persistence, direct calls
//! - Catalog lists are cached in memory via `moka`, keyed by resource name;
//!   a successful mutation invalidates its resource's keys
//! - Cart and auth calls are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use hoopshop_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//!
//! let products = client.list_products().await?;
//! client.add_to_cart(user.id, products[0].id, 1).await?;
//! let lines = client.view_cart(user.id).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use cache::CacheKey;
pub use client::ApiClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the shop API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connect, timeout, TLS, body read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}{}", format_message(.message.as_deref()))]
    Status {
        status: u16,
        /// Server-provided `message`, when the body carried one.
        message: Option<String>,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// A request URL could not be built from the configured origin.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// The message the server sent along with an error status, if any.
    ///
    /// Login and registration show this text to the visitor.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status {
                message: Some(m), ..
            } => Some(m),
            _ => None,
        }
    }

    /// Whether this is a client-side rejection (4xx) rather than an outage.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status >= 400 && *status < 500,
            Self::NotFound(_) => true,
            _ => false,
        }
    }
}

fn format_message(message: Option<&str>) -> String {
    message.map_or_else(String::new, |m| format!(": {m}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("products/123".to_string());
        assert_eq!(err.to_string(), "Not found: products/123");
    }

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status {
            status: 401,
            message: Some("Invalid credentials".to_string()),
        };
        assert_eq!(err.to_string(), "API returned 401: Invalid credentials");
        assert_eq!(err.server_message(), Some("Invalid credentials"));
        assert!(err.is_client_error());

        let err = ApiError::Status {
            status: 503,
            message: None,
        };
        assert_eq!(err.to_string(), "API returned 503");
        assert_eq!(err.server_message(), None);
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_rate_limited_error() {
        let err = ApiError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
