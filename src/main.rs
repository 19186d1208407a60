use std::net::TcpListener;

use anyhow::Context;

use brandsite::app;
use brandsite::controller::contact::ContactInbox;
use brandsite::settings::Settings;
use brandsite::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = telemetry::create_subscriber("info", std::io::stdout);
    telemetry::set_subscriber(subscriber)?;

    let settings = Settings::load()?;

    let email_client = settings.email.client()?;
    if !email_client.is_configured() {
        tracing::warn!("No email API key configured, form submissions will fail");
    }
    let contact_inbox = ContactInbox(settings.email.contact_recipient()?);

    let feed_client = settings.feed.client()?;
    tracing::info!("Republishing blog posts from {}", feed_client.feed_url());

    let listener = TcpListener::bind(settings.app.addr())?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    app::run(listener, email_client, feed_client, contact_inbox)?
        .await
        .context("Failed to run app")
}
