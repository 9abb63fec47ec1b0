//! Account roles.

use serde::{Deserialize, Serialize};

/// Role attached to an account by the remote API.
///
/// Unknown role strings deserialize as [`Role::User`] so a new server-side
/// role never grants admin access by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Back-office administrator.
    Admin,
    /// Ordinary shopper. Must stay last for `#[serde(other)]`.
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    /// Whether this role may use the admin back-office.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Where a freshly logged-in account with this role lands.
    #[must_use]
    pub const fn landing_path(self) -> &'static str {
        match self {
            Self::Admin => crate::paths::ADMIN_DASHBOARD,
            Self::User => crate::paths::PRODUCT_LIST,
        }
    }

    /// Lower-case name as served by the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}
