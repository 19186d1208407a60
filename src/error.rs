use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use thiserror::Error;

use crate::client::ServiceError;
use crate::controller::ApiResponse;
use crate::domain::ValidationError;

pub type RestResult<T> = Result<T, RestError>;

/// Failures surfaced to API callers.
///
/// The `Display` text is the exact message put in the response body, so
/// variants wrapping internal errors never include their source.
#[derive(Debug, Error)]
pub enum RestError {
    #[error("Invalid request body")]
    InvalidBody,

    #[error("Request body is too large")]
    BodyTooLarge,

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Unable to subscribe. Please try again later.")]
    Subscribe(#[source] ServiceError),

    #[error("Unable to send your message. Please try again later.")]
    SendMessage(#[source] ServiceError),
}

impl ResponseError for RestError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBody | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Subscribe(_) | Self::SendMessage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::failure(self.to_string()))
    }
}
