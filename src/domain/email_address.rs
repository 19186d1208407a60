use std::fmt;
use std::str::FromStr;

use regex::Regex;

use super::ValidationError;

/// A user supplied email-address, trimmed and lowercased
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct EmailAddress(String);

impl FromStr for EmailAddress {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        lazy_static::lazy_static! {
            // One `@`, a non-empty local part and a dotted domain
            static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
        }

        // Normalize
        let value = value.trim().to_lowercase();

        if value.is_empty() {
            return Err(ValidationError::EmailRequired);
        }
        if !EMAIL_REGEX.is_match(&value) {
            return Err(ValidationError::InvalidEmailFormat);
        }

        Ok(Self(value))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
