//! Validated domain primitives.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::ValidateEmail;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueTypeError {
    #[error("Email is required")]
    EmptyEmail,
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
}

// ============================================================================
// Email
// ============================================================================

/// A normalized, validated email address.
///
/// Normalization trims surrounding whitespace and lowercases the domain
/// part. The local part keeps its casing, since mailbox names may be case
/// sensitive.
///
/// ```ignore
/// let email = Email::parse("  Ana.Silva@Example.COM ")?;
/// assert_eq!(email.as_str(), "Ana.Silva@example.com");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, ValueTypeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValueTypeError::EmptyEmail);
        }

        let normalized = match trimmed.rsplit_once('@') {
            Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
            None => trimmed.to_string(),
        };

        if !normalized.validate_email() {
            return Err(ValueTypeError::InvalidEmail(trimmed.to_string()));
        }

        Ok(Self(normalized))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map(|(_, d)| d).unwrap_or("")
    }
}

impl fmt::Debug for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Email({})", self.0)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Email {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_is_lowercased() {
        let email = Email::parse("Ana.Silva@Example.COM").unwrap();
        assert_eq!(email.as_str(), "Ana.Silva@example.com");
        assert_eq!(email.domain(), "example.com");
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(Email::parse("  a@x.com\n").unwrap().as_str(), "a@x.com");
    }

    #[test]
    fn test_empty_is_rejected() {
        assert_eq!(Email::parse("").unwrap_err(), ValueTypeError::EmptyEmail);
        assert_eq!(Email::parse("   ").unwrap_err(), ValueTypeError::EmptyEmail);
    }

    #[test]
    fn test_malformed_is_rejected() {
        assert!(matches!(
            Email::parse("not-an-email"),
            Err(ValueTypeError::InvalidEmail(_))
        ));
        assert!(Email::parse("a@").is_err());
    }
}
