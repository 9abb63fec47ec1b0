//! Session-related types.
//!
//! The session holds what a browser client would keep in local storage:
//! the auth token, the user record and the cart.

use secrecy::SecretString;

use hoopshop_core::{User, UserId};

/// The logged-in visitor, assembled from the `token` and `user` session keys.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    /// Opaque token issued by the shop API.
    pub token: SecretString,
}

impl CurrentUser {
    #[must_use]
    pub fn new(user: User, token: impl Into<String>) -> Self {
        Self {
            user,
            token: SecretString::from(token.into()),
        }
    }

    #[must_use]
    pub const fn id(&self) -> UserId {
        self.user.id
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.user.is_admin()
    }
}

/// Session keys.
pub mod keys {
    /// Opaque auth token string.
    pub const TOKEN: &str = "token";

    /// Serialized [`hoopshop_core::User`].
    pub const USER: &str = "user";

    /// Serialized [`hoopshop_core::CartState`].
    pub const CART: &str = "cart";

    /// One-shot notice shown on the next rendered page.
    pub const FLASH: &str = "flash";
}
