mod contact_message;
mod email_address;
mod message_body;
mod newsletter_signup;
mod person_name;
mod post;

pub use contact_message::ContactMessage;
pub use email_address::EmailAddress;
pub use message_body::MessageBody;
pub use newsletter_signup::NewsletterSignup;
pub use person_name::PersonName;
pub use post::{excerpt_from_html, first_image_src, read_time_minutes, NormalizedPost};

/// A submitted field failed validation; the message is shown to the visitor as-is
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,
    #[error("Email is required")]
    EmailRequired,
    #[error("Invalid email format")]
    InvalidEmailFormat,
    #[error("Message is required")]
    MessageRequired,
}
