use super::{EmailAddress, ValidationError};

/// A validated newsletter signup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterSignup {
    pub email: EmailAddress,
    /// Trimmed, `None` when blank
    pub first_name: Option<String>,
}

impl NewsletterSignup {
    pub fn parse(email: Option<&str>, first_name: Option<&str>) -> Result<Self, ValidationError> {
        let email = email.unwrap_or_default().parse()?;
        let first_name = first_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from);

        Ok(Self { email, first_name })
    }
}
