//! Authentication route handlers.
//!
//! Login and registration are delegated to the shop API. On success the token
//! and user record go into the session, the cart is pulled from the server and
//! the visitor is sent to the landing page for their role.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hoopshop_core::{Registration, User, Validate, paths};

use crate::api::{ApiError, AuthResponse};
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{Flash, OptionalAuth, clear_current_user, set_current_user, set_flash};
use crate::routes::PageContext;
use crate::services::CartService;
use crate::state::AppState;

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const REGISTERED_NOTICE: &str = "Registration successful. Please log in.";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl From<RegisterForm> for Registration {
    fn from(form: RegisterForm) -> Self {
        Self {
            name: form.name,
            email: form.email,
            password: form.password,
            confirm_password: form.confirm_password,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    pub email: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub errors: Vec<String>,
    pub name: String,
    pub email: String,
}

// =============================================================================
// Helpers
// =============================================================================

/// The message to show for a failed auth call.
fn failure_message(err: &ApiError, fallback: &str) -> String {
    err.server_message().unwrap_or(fallback).to_string()
}

/// Store the session, pull the cart and tag Sentry with the user.
async fn start_session(
    state: &AppState,
    session: &Session,
    token: &str,
    user: &User,
) -> Result<(), AppError> {
    session.cycle_id().await?;
    set_current_user(session, token, user).await?;
    set_sentry_user(&user.id, Some(&user.email));

    if let Err(e) = CartService::new(state.api(), session).reconcile(user.id).await {
        tracing::warn!(error = %e, user_id = %user.id, "Cart reconcile after login failed");
    }
    Ok(())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(session: Session, OptionalAuth(current): OptionalAuth) -> Response {
    if let Some(current) = current {
        return Redirect::to(current.user.role.landing_path()).into_response();
    }

    LoginTemplate {
        page: PageContext::load(&session, None).await,
        error: None,
        email: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let message = match state.api().login(form.email.trim(), &form.password).await {
        Ok(response) => {
            let fallback = response.message.clone();
            match response.into_session() {
                Some((token, user)) => {
                    start_session(&state, &session, &token, &user).await?;
                    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User logged in");
                    return Ok(Redirect::to(user.role.landing_path()).into_response());
                }
                None => fallback.unwrap_or_else(|| LOGIN_FAILED.to_string()),
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            failure_message(&e, LOGIN_FAILED)
        }
    };

    Ok(LoginTemplate {
        page: PageContext::load(&session, None).await,
        error: Some(message),
        email: form.email,
    }
    .into_response())
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(session: Session) -> impl IntoResponse {
    RegisterTemplate {
        page: PageContext::load(&session, None).await,
        errors: Vec::new(),
        name: String::new(),
        email: String::new(),
    }
}

/// Handle registration form submission.
///
/// Local checks run first; the API is only called when they pass.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let registration = Registration::from(form);

    let errors = match registration.validate() {
        Err(errors) => errors.iter().map(|e| e.message.clone()).collect(),
        Ok(()) => match state
            .api()
            .register(
                registration.name.trim(),
                registration.email.trim(),
                &registration.password,
            )
            .await
        {
            Ok(response) => return finish_registration(&state, &session, response).await,
            Err(e) => {
                tracing::warn!(error = %e, "Registration failed");
                vec![failure_message(&e, REGISTRATION_FAILED)]
            }
        },
    };

    Ok(RegisterTemplate {
        page: PageContext::load(&session, None).await,
        errors,
        name: registration.name,
        email: registration.email,
    }
    .into_response())
}

/// A token means the account is usable right away; otherwise go log in.
async fn finish_registration(
    state: &AppState,
    session: &Session,
    response: AuthResponse,
) -> Result<Response, AppError> {
    if let Some((token, user)) = response.into_session() {
        start_session(state, session, &token, &user).await?;
        tracing::info!(user_id = %user.id, "User registered and logged in");
        return Ok(Redirect::to(paths::PRODUCT_LIST).into_response());
    }

    set_flash(session, Flash::success(REGISTERED_NOTICE)).await?;
    Ok(Redirect::to(paths::LOGIN).into_response())
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session).await?;
    session.flush().await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_prefers_server_text() {
        let err = ApiError::Status {
            status: 401,
            message: Some("Invalid email or password".to_string()),
        };
        assert_eq!(failure_message(&err, LOGIN_FAILED), "Invalid email or password");

        let err = ApiError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(failure_message(&err, LOGIN_FAILED), "Login failed");
        assert_eq!(
            failure_message(&ApiError::RateLimited(1), REGISTRATION_FAILED),
            "Registration failed"
        );
    }
}
