use super::{EmailAddress, MessageBody, PersonName, ValidationError};

/// A validated contact form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: PersonName,
    pub email: EmailAddress,
    pub message: MessageBody,
}

impl ContactMessage {
    /// Fields are checked in order: name, email, message. The first failure wins.
    pub fn parse(
        name: Option<&str>,
        email: Option<&str>,
        message: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let name = name.unwrap_or_default().parse()?;
        let email = email.unwrap_or_default().parse()?;
        let message = message.unwrap_or_default().parse()?;

        Ok(Self {
            name,
            email,
            message,
        })
    }
}
