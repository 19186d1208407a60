use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Free-form text of a contact message
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MessageBody(String);

impl AsRef<str> for MessageBody {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for MessageBody {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ValidationError::MessageRequired);
        }
        Ok(Self(value.to_string()))
    }
}
