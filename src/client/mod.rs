mod email_client;
mod feed_client;

pub use email_client::{
    Email, EmailClient, NewsletterContact, Operation, SentEmail, ServiceError, ServiceResult,
};
pub use feed_client::{parse_feed, FeedClient, FeedError, PostError};
