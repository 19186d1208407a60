use actix_web::dev::HttpServiceFactory;
use actix_web::{post, web, HttpResponse};

use serde::Deserialize;
use serde_json::Value;

use crate::client::{Email, EmailClient};
use crate::domain::{ContactMessage, EmailAddress};
use crate::error::{RestError, RestResult};

use super::{as_text, is_filled, parse_json_object, read_body, ApiResponse};

/// Address that receives contact form messages
#[derive(Debug, Clone)]
pub struct ContactInbox(pub EmailAddress);

/// Raw contact form body.
///
/// `website` is a honeypot: the field is hidden from people, so anything in it came from a bot.
#[derive(Debug, Deserialize)]
pub struct ContactBody {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    email: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    website: Option<Value>,
}

impl ContactBody {
    fn is_spam(&self) -> bool {
        is_filled(&self.website)
    }
}

impl TryFrom<ContactBody> for ContactMessage {
    type Error = RestError;

    fn try_from(body: ContactBody) -> RestResult<Self> {
        let contact = ContactMessage::parse(
            as_text(&body.name),
            as_text(&body.email),
            as_text(&body.message),
        )?;
        Ok(contact)
    }
}

/// Contact form endpoint
#[tracing::instrument(name = "Send a contact message", skip(body, email_client, inbox))]
#[post("")]
async fn send(
    body: Result<web::Bytes, actix_web::Error>,
    email_client: web::Data<EmailClient>,
    inbox: web::Data<ContactInbox>,
) -> RestResult<HttpResponse> {
    let body = read_body(body)?;
    let body: ContactBody = parse_json_object(&body)?;

    // Answer bots as if the message went through
    if body.is_spam() {
        tracing::info!("Dropping contact message with a filled honeypot field");
        return Ok(HttpResponse::Ok().json(ApiResponse::silent_success()));
    }

    let contact: ContactMessage = body.try_into()?;
    let email = build_contact_email(&contact, &inbox.0);

    let sent = email_client.send_email(&email).await.map_err(|error| {
        tracing::error!(
            error.cause_chain = ?error,
            error.message = %error,
            "Failed to forward contact message"
        );
        RestError::SendMessage(error)
    })?;

    tracing::info!("Forwarded contact message (email id: {})", sent.email_id);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Thank you for your message. We will get back to you soon.",
    )))
}

/// Build the notification sent to the site owner for a contact message
fn build_contact_email(contact: &ContactMessage, inbox: &EmailAddress) -> Email {
    let name = contact.name.as_ref();
    let email = contact.email.as_ref();
    let message = contact.message.as_ref();

    let subject = format!("New contact form submission from {}", name);
    let html = format!(
        "<h2>New contact form submission</h2>\
         <p><strong>Name:</strong> {}</p>\
         <p><strong>Email:</strong> {}</p>\
         <p><strong>Message:</strong></p>\
         <p>{}</p>",
        escape_html(name),
        escape_html(email),
        escape_html(message).replace('\n', "<br>")
    );
    let text = format!(
        "New contact form submission\n\nName: {}\nEmail: {}\n\nMessage:\n{}",
        name, email, message
    );

    Email {
        to: inbox.clone(),
        subject,
        html: Some(html),
        text: Some(text),
        from: None,
        reply_to: Some(contact.email.clone()),
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Contact API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/api/contact").service(send)
}
