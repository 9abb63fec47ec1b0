//! Accounts as returned by the auth endpoints.

use serde::{Deserialize, Serialize};

use crate::{Email, Role, UserId, Validate, ValidationErrors};

/// The account record from `POST /api/auth/login` and `/register`.
///
/// Stored verbatim in the visitor's session under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Name for the header greeting, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// A submitted registration form, checked before calling the API.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl Validate for Registration {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        if let Err(e) = Email::parse(&self.email) {
            errors.add("email", e.to_string());
        }
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        } else if self.password != self.confirm_password {
            errors.add("confirm_password", "Passwords do not match.");
        }
        errors.into_result()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registration() -> Registration {
        Registration {
            name: "Steph".to_string(),
            email: "steph@dubs.com".to_string(),
            password: "splash30".to_string(),
            confirm_password: "splash30".to_string(),
        }
    }

    #[test]
    fn test_user_from_login_response() {
        let json = r#"{"id":"12","name":"Steph","email":"steph@dubs.com","role":"admin"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, UserId::new(12));
        assert!(user.is_admin());
    }

    #[test]
    fn test_missing_role_defaults_to_user() {
        let json = r#"{"id":3,"email":"fan@example.com"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.display_name(), "fan@example.com");
    }

    #[test]
    fn test_registration_ok() {
        assert!(registration().validate().is_ok());
    }

    #[test]
    fn test_registration_password_mismatch() {
        let form = Registration {
            confirm_password: "different".to_string(),
            ..registration()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("confirm_password"), Some("Passwords do not match."));
    }

    #[test]
    fn test_registration_bad_email_and_name() {
        let form = Registration {
            name: String::new(),
            email: "not-an-email".to_string(),
            ..registration()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.get("name").is_some());
        assert!(errors.get("email").is_some());
    }
}
