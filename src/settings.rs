use std::env;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use config::{Config, Environment, File};

use secrecy::{ExposeSecret, Secret};

use serde::Deserialize;
use serde_aux::prelude::*;

use url::Url;

use crate::client::{EmailClient, FeedClient};
use crate::domain::EmailAddress;

/// Runtime environment, either `Dev` for local development, or `Prod` for release
#[derive(Debug)]
pub enum Runtime {
    Dev,
    Prod,
}

impl Runtime {
    pub fn as_str(&self) -> &str {
        match self {
            Runtime::Dev => "dev",
            Runtime::Prod => "prod",
        }
    }
}

impl TryFrom<String> for Runtime {
    type Error = anyhow::Error;

    fn try_from(s: String) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            other => anyhow::bail!("{} is not a valid runtime environment", other),
        }
    }
}

/// Application settings wrapper
#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: ApplicationSettings,
    pub email: EmailSettings,
    pub feed: FeedSettings,
}

impl Settings {
    /// Load application settings from the settings directory
    pub fn load() -> anyhow::Result<Self> {
        // Get the path to the settings directory
        let path = env::current_dir()?.join("settings");
        // Get the current environment based on the `APP_ENV` environment variable, default to `Dev`
        let runtime: Runtime = env::var("APP_ENV")
            .unwrap_or_else(|_| "dev".into())
            .try_into()?;

        Self::load_from(runtime, &path)
    }
    /// Load application settings from a specified path and runtime
    pub fn load_from(runtime: Runtime, base_path: &Path) -> anyhow::Result<Self> {
        Config::builder()
            // Include the base settings
            .add_source(File::from(base_path.join("base")).required(true))
            // Include the runtime settings
            .add_source(File::from(base_path.join(runtime.as_str())).required(true))
            // Override/include any settings from environment variables
            // NOTE: Should be used for any prod secrets. Takes the form `APP_<settings category>__<setting name>`.
            .add_source(
                Environment::with_prefix("app")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
            .context("Failed to load/deserialize settings")
    }
}

#[derive(Debug, Deserialize)]
pub struct ApplicationSettings {
    host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    port: u16,
}

impl ApplicationSettings {
    /// The application address to bind to
    pub fn addr(&self) -> (&str, u16) {
        (&self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
pub struct EmailSettings {
    sender: String,
    contact_recipient: String,
    api_base_url: String,
    #[serde(default)]
    api_key: Option<Secret<String>>,
    #[serde(default)]
    audience_id: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    api_timeout_milliseconds: u64,
}

impl EmailSettings {
    /// The email address to send application emails from
    pub fn sender(&self) -> anyhow::Result<EmailAddress> {
        self.sender
            .parse()
            .context("Failed to parse email sender address")
    }
    /// The address contact form messages are delivered to
    pub fn contact_recipient(&self) -> anyhow::Result<EmailAddress> {
        self.contact_recipient
            .parse()
            .context("Failed to parse contact recipient address")
    }
    /// The email REST API timeout duration
    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout_milliseconds)
    }
    /// The base URL for the email REST service
    pub fn api_base_url(&self) -> anyhow::Result<Url> {
        Url::parse(&self.api_base_url).context("Failed to parse email base URL")
    }
    /// The API key, `None` when unset or blank
    pub fn api_key(&self) -> Option<Secret<String>> {
        self.api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .cloned()
    }
    /// The newsletter audience, `None` when unset or blank
    pub fn audience_id(&self) -> Option<&str> {
        self.audience_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
    /// Build the email client described by these settings
    pub fn client(&self) -> anyhow::Result<EmailClient> {
        EmailClient::new(
            self.sender()?,
            self.api_timeout(),
            self.api_base_url()?,
            self.api_key(),
            self.audience_id(),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct FeedSettings {
    base_url: String,
    username: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    limit: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    revalidate_seconds: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    timeout_milliseconds: u64,
}

impl FeedSettings {
    /// The RSS feed of the configured user
    pub fn feed_url(&self) -> anyhow::Result<Url> {
        let username = self.username.trim().trim_start_matches('@');
        anyhow::ensure!(!username.is_empty(), "Feed username cannot be empty");

        Url::parse(&self.base_url)
            .and_then(|base| base.join(&format!("feed/@{}", username)))
            .context("Failed to build feed URL")
    }
    /// How long fetched posts are served before the feed is fetched again
    pub fn revalidate_after(&self) -> Duration {
        Duration::from_secs(self.revalidate_seconds)
    }
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
    /// Build the feed client described by these settings
    pub fn client(&self) -> anyhow::Result<FeedClient> {
        FeedClient::new(
            self.feed_url()?,
            self.limit,
            self.revalidate_after(),
            self.timeout(),
        )
    }
}
