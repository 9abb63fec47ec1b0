//! Authentication extractors.
//!
//! The visitor counts as logged in when the session holds both a `token`
//! and a `user` record.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use hoopshop_core::{User, paths};

use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a logged-in user.
///
/// Anonymous visitors are redirected to the login page.
///
/// ```rust,ignore
/// async fn cart_page(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Cart of {}", user.user.display_name())
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a logged-in user with the `admin` role.
///
/// Anonymous visitors go to the login page; other users to the product listing.
pub struct RequireAdmin(pub CurrentUser);

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<CurrentUser>);

/// Why an auth extractor refused the request.
#[derive(Debug)]
pub enum AuthRejection {
    /// Not logged in.
    RedirectToLogin,
    /// Logged in without the admin role.
    RedirectToProducts,
    /// Session layer missing from the stack.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(paths::LOGIN).into_response(),
            Self::RedirectToProducts => Redirect::to(paths::PRODUCT_LIST).into_response(),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Read the current user out of a session.
///
/// A session with only one of the two keys counts as logged out.
pub async fn current_user(session: &Session) -> Option<CurrentUser> {
    let token: String = session.get(session_keys::TOKEN).await.ok().flatten()?;
    let user: User = session.get(session_keys::USER).await.ok().flatten()?;
    (!token.is_empty()).then(|| CurrentUser::new(user, token))
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::MissingSession)?;

        current_user(session)
            .await
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(current) = RequireAuth::from_request_parts(parts, state).await?;
        if current.is_admin() {
            Ok(Self(current))
        } else {
            tracing::debug!(user_id = %current.id(), "Non-admin denied admin route");
            Err(AuthRejection::RedirectToProducts)
        }
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store the token and user after login or registration.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    token: &str,
    user: &User,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::TOKEN, token).await?;
    session.insert(session_keys::USER, user).await
}

/// Remove the token, user and cart (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove_value(session_keys::TOKEN).await?;
    session.remove_value(session_keys::USER).await?;
    session.remove_value(session_keys::CART).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use hoopshop_core::{Role, UserId};
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn user() -> User {
        User {
            id: UserId::new(7),
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_current_user_requires_token_and_user() {
        let session = session();
        assert!(current_user(&session).await.is_none());

        session.insert(session_keys::USER, user()).await.unwrap();
        assert!(current_user(&session).await.is_none());

        session.insert(session_keys::TOKEN, "abc").await.unwrap();
        let current = current_user(&session).await.unwrap();
        assert_eq!(current.id(), UserId::new(7));
    }

    #[tokio::test]
    async fn test_clear_removes_cart_too() {
        let session = session();
        set_current_user(&session, "abc", &user()).await.unwrap();
        session
            .insert(session_keys::CART, hoopshop_core::CartState::new())
            .await
            .unwrap();

        clear_current_user(&session).await.unwrap();

        assert!(current_user(&session).await.is_none());
        let cart: Option<hoopshop_core::CartState> =
            session.get(session_keys::CART).await.unwrap();
        assert!(cart.is_none());
    }

    #[test]
    fn test_rejection_redirects() {
        let resp = AuthRejection::RedirectToLogin.into_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()["location"], paths::LOGIN);

        let resp = AuthRejection::RedirectToProducts.into_response();
        assert_eq!(resp.headers()["location"], paths::PRODUCT_LIST);
    }
}
