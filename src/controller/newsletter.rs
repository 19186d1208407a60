use actix_web::dev::HttpServiceFactory;
use actix_web::{post, web, HttpResponse, Responder};

use serde::Deserialize;
use serde_json::Value;

use crate::client::EmailClient;
use crate::domain::NewsletterSignup;
use crate::error::{RestError, RestResult};

use super::{as_text, parse_json_object, read_body, ApiResponse};

/// Raw signup body, fields are checked when converting into a [`NewsletterSignup`]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterBody {
    #[serde(default)]
    email: Option<Value>,
    #[serde(default)]
    first_name: Option<Value>,
}

impl TryFrom<NewsletterBody> for NewsletterSignup {
    type Error = RestError;

    fn try_from(body: NewsletterBody) -> RestResult<Self> {
        let signup = NewsletterSignup::parse(as_text(&body.email), as_text(&body.first_name))?;
        Ok(signup)
    }
}

/// Newsletter signup endpoint
#[tracing::instrument(name = "Subscribe to the newsletter", skip(body, email_client))]
#[post("")]
async fn subscribe(
    body: Result<web::Bytes, actix_web::Error>,
    email_client: web::Data<EmailClient>,
) -> RestResult<impl Responder> {
    let body = read_body(body)?;
    let body: NewsletterBody = parse_json_object(&body)?;
    let signup: NewsletterSignup = body.try_into()?;

    let contact = email_client
        .add_to_newsletter(&signup)
        .await
        .map_err(|error| {
            tracing::error!(
                error.cause_chain = ?error,
                error.message = %error,
                "Failed to add newsletter contact"
            );
            RestError::Subscribe(error)
        })?;

    tracing::info!("Added newsletter contact {}", contact.contact_id);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Successfully subscribed to the newsletter",
    )))
}

/// Newsletter API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/api/newsletter").service(subscribe)
}
