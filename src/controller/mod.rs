use actix_web::http::StatusCode;
use actix_web::web;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{RestError, RestResult};

/// Contact form endpoint
pub mod contact;
/// Newsletter signup endpoint
pub mod newsletter;
/// Blog posts republished from the external feed
pub mod posts;

/// JSON envelope shared by the form endpoints
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    /// A success without any message
    pub fn silent_success() -> Self {
        Self {
            success: true,
            message: None,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Largest form submission accepted, in bytes
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Unwrap an extracted request body, reporting extractor failures as JSON errors
fn read_body(body: Result<web::Bytes, actix_web::Error>) -> RestResult<web::Bytes> {
    body.map_err(|error| {
        if error.as_response_error().status_code() == StatusCode::PAYLOAD_TOO_LARGE {
            RestError::BodyTooLarge
        } else {
            RestError::InvalidBody
        }
    })
}

/// Deserialize a request body that must be a JSON object
fn parse_json_object<T: DeserializeOwned>(body: &[u8]) -> RestResult<T> {
    match serde_json::from_slice(body) {
        Ok(value @ Value::Object(_)) => {
            serde_json::from_value(value).map_err(|_| RestError::InvalidBody)
        }
        _ => Err(RestError::InvalidBody),
    }
}

/// The value as text, `None` for anything that is not a JSON string
fn as_text(value: &Option<Value>) -> Option<&str> {
    value.as_ref().and_then(Value::as_str)
}

/// Whether a form field holds anything a person would have had to type or tick
fn is_filled(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
