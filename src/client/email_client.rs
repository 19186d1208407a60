use std::fmt;
use std::time::Duration;

use anyhow::Context;

use reqwest::{Client, StatusCode};

use secrecy::{ExposeSecret, Secret};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use url::Url;

use crate::domain::{EmailAddress, NewsletterSignup};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// The provider call an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AddContact,
    SendEmail,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddContact => f.write_str("Failed to add contact to newsletter"),
            Self::SendEmail => f.write_str("Failed to send email"),
        }
    }
}

/// Normalized failure of the email service.
///
/// Messages are meant for logs, not for visitors.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("{operation}: {message}")]
    Provider {
        operation: Operation,
        status: StatusCode,
        message: String,
    },

    #[error("{operation}: {source}")]
    Transport {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },
}

/// A contact created in the newsletter audience
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterContact {
    pub contact_id: String,
}

/// An email accepted by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub email_id: String,
}

/// An outgoing email. At least one of `html` or `text` must be set.
#[derive(Debug, Clone)]
pub struct Email {
    pub to: EmailAddress,
    pub subject: String,
    pub html: Option<String>,
    pub text: Option<String>,
    /// Defaults to the configured sender
    pub from: Option<EmailAddress>,
    pub reply_to: Option<EmailAddress>,
}

impl Email {
    fn as_request<'e>(&'e self, sender: &'e EmailAddress) -> SendEmailRequest<'e> {
        SendEmailRequest {
            from: self.from.as_ref().unwrap_or(sender).as_ref(),
            to: [self.to.as_ref()],
            subject: &self.subject,
            html: self.html.as_deref(),
            text: self.text.as_deref(),
            reply_to: self.reply_to.as_ref().map(AsRef::as_ref),
        }
    }
}

/// REST client for the transactional email and audience API
#[derive(Debug)]
pub struct EmailClient {
    client: Client,
    sender: EmailAddress,

    api_send_email_url: Url,
    api_contacts_url: Option<Url>,
    api_key: Option<Secret<String>>,
}

impl EmailClient {
    /// Without an `api_key` every operation fails with [`ServiceError::NotConfigured`],
    /// without an `audience_id` only newsletter signups do.
    pub fn new(
        sender: EmailAddress,
        api_timeout: Duration,
        api_base_url: Url,
        api_key: Option<Secret<String>>,
        audience_id: Option<&str>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(api_timeout)
            .build()
            .context("Failed to build http client")?;

        let api_send_email_url = api_base_url
            .join("emails")
            .context("Failed to create send email endpoint URL")?;

        let api_contacts_url = audience_id
            .map(|id| api_base_url.join(&format!("audiences/{}/contacts", id)))
            .transpose()
            .context("Failed to create contacts endpoint URL")?;

        Ok(Self {
            client,
            sender,
            api_send_email_url,
            api_contacts_url,
            api_key,
        })
    }

    /// Whether an API key is present
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[tracing::instrument(name = "Add a contact to the newsletter audience", skip(self))]
    pub async fn add_to_newsletter(
        &self,
        signup: &NewsletterSignup,
    ) -> ServiceResult<NewsletterContact> {
        let url = self
            .api_contacts_url
            .as_ref()
            .ok_or(ServiceError::NotConfigured)?;

        let body = CreateContactRequest {
            email: signup.email.as_ref(),
            first_name: signup.first_name.as_deref(),
            unsubscribed: false,
        };

        let res: IdResponse = self.post(Operation::AddContact, url, &body).await?;

        Ok(NewsletterContact { contact_id: res.id })
    }

    #[tracing::instrument(name = "Send an email via API", skip(self, email), fields(subject = %email.subject))]
    pub async fn send_email(&self, email: &Email) -> ServiceResult<SentEmail> {
        let body = email.as_request(&self.sender);

        let res: IdResponse = self
            .post(Operation::SendEmail, &self.api_send_email_url, &body)
            .await?;

        Ok(SentEmail { email_id: res.id })
    }

    async fn post<B, R>(&self, operation: Operation, url: &Url, body: &B) -> ServiceResult<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let api_key = self.api_key.as_ref().ok_or(ServiceError::NotConfigured)?;
        let transport = |source| ServiceError::Transport { operation, source };

        let res = self
            .client
            .post(url.clone())
            .bearer_auth(api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(transport)?;

        let status = res.status();
        if !status.is_success() {
            // Fall back to the status line when the error body is unreadable
            let message = res
                .json::<ProviderErrorResponse>()
                .await
                .ok()
                .and_then(|err| err.message.or(err.name))
                .unwrap_or_else(|| status.to_string());

            return Err(ServiceError::Provider {
                operation,
                status,
                message,
            });
        }

        res.json().await.map_err(transport)
    }
}

#[derive(Debug, Serialize)]
struct CreateContactRequest<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    unsubscribed: bool,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}
