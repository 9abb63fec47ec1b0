//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Reasons an email address is rejected by [`Email::parse`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// Nothing but whitespace was entered.
    #[error("email is required")]
    Empty,
    /// Longer than the RFC 5321 limit.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// Missing `@`, or more than one.
    #[error("email must contain exactly one @")]
    BadSeparator,
    /// Nothing before the `@`.
    #[error("email is missing the part before @")]
    EmptyMailbox,
    /// Domain is empty or has no dot.
    #[error("email domain {0:?} is not valid")]
    BadDomain(String),
    /// Embedded whitespace.
    #[error("email cannot contain spaces")]
    Whitespace,
}

/// An email address as typed into the login and registration forms.
///
/// Validation is deliberately close to what a browser's `type="email"` input
/// accepts: one `@`, a non-empty mailbox, and a dotted domain. Surrounding
/// whitespace is trimmed and the domain is lower-cased; the mailbox is kept as
/// entered.
///
/// ```
/// use hoopshop_core::Email;
///
/// let email = Email::parse("  Jordan@Bulls.COM ").unwrap();
/// assert_eq!(email.as_str(), "Jordan@bulls.com");
///
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("user@localhost").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse and normalize an email address.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first problem found.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        let (mailbox, domain) = s.split_once('@').ok_or(EmailError::BadSeparator)?;
        if domain.contains('@') {
            return Err(EmailError::BadSeparator);
        }
        if mailbox.is_empty() {
            return Err(EmailError::EmptyMailbox);
        }

        let domain = domain.to_ascii_lowercase();
        let labels_ok = domain.split('.').all(|label| !label.is_empty());
        if !domain.contains('.') || !labels_ok {
            return Err(EmailError::BadDomain(domain));
        }

        Ok(Self(format!("{mailbox}@{domain}")))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_shapes() {
        for ok in [
            "user@example.com",
            "first.last+tag@sub.example.co.uk",
            "a@b.c",
        ] {
            assert!(Email::parse(ok).is_ok(), "{ok} should parse");
        }
    }

    #[test]
    fn test_trims_and_lowercases_domain() {
        let email = Email::parse("  Kobe@Lakers.COM\n").unwrap();
        assert_eq!(email.as_str(), "Kobe@lakers.com");
    }

    #[test]
    fn test_rejections() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        assert_eq!(Email::parse("plain"), Err(EmailError::BadSeparator));
        assert_eq!(Email::parse("a@b@c.com"), Err(EmailError::BadSeparator));
        assert_eq!(Email::parse("@court.com"), Err(EmailError::EmptyMailbox));
        assert_eq!(Email::parse("two words@x.com"), Err(EmailError::Whitespace));
        assert!(matches!(
            Email::parse("user@localhost"),
            Err(EmailError::BadDomain(_))
        ));
        assert!(matches!(
            Email::parse("user@example..com"),
            Err(EmailError::BadDomain(_))
        ));
    }

    #[test]
    fn test_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(
            Email::parse(&long),
            Err(EmailError::TooLong {
                max: Email::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_serde_is_transparent() {
        let email = Email::parse("user@example.com").unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"user@example.com\"");
    }
}
