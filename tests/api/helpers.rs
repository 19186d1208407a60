use std::net::TcpListener;
use std::time::Duration;

use reqwest::{Client, Method, Response};

use secrecy::Secret;

use serde_json::Value;

use url::Url;

use wiremock::MockServer;

use brandsite::app;
use brandsite::client::{EmailClient, FeedClient};
use brandsite::controller::contact::ContactInbox;

pub const AUDIENCE_ID: &str = "test-audience";
pub const CONTACT_INBOX: &str = "owner@test.com";
pub const FEED_USERNAME: &str = "writer";

pub struct TestApp {
    addr: String,

    pub client: Client,
    pub email_server: MockServer,
    pub feed_server: MockServer,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_api_key(Some("TestAuthorization")).await
    }

    /// Spawn an app whose email client has no API key
    pub async fn spawn_unconfigured() -> Self {
        Self::spawn_with_api_key(None).await
    }

    async fn spawn_with_api_key(api_key: Option<&str>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to listen on random port");
        let port = listener.local_addr().unwrap().port();

        let addr = format!("http://127.0.0.1:{}", port);

        let email_server = MockServer::start().await;
        let feed_server = MockServer::start().await;

        let email_client = {
            let sender = "site@test.com"
                .parse()
                .expect("Failed to parse sender email address");
            let api_base_url =
                Url::parse(&email_server.uri()).expect("Failed to parse mock server uri");
            let api_key = api_key.map(|key| Secret::new(key.to_string()));
            let api_timeout = Duration::from_secs(2);

            EmailClient::new(sender, api_timeout, api_base_url, api_key, Some(AUDIENCE_ID))
                .expect("Failed to create email client")
        };

        let feed_client = {
            let feed_url = Url::parse(&feed_server.uri())
                .and_then(|base| base.join(&format!("feed/@{}", FEED_USERNAME)))
                .expect("Failed to build feed url");

            FeedClient::new(feed_url, 10, Duration::from_secs(600), Duration::from_secs(2))
                .expect("Failed to create feed client")
        };

        let contact_inbox = ContactInbox(
            CONTACT_INBOX
                .parse()
                .expect("Failed to parse contact inbox address"),
        );

        let server = app::run(listener, email_client, feed_client, contact_inbox)
            .expect("Failed to spawn app instance");
        let _ = tokio::spawn(server);

        let client = Client::new();

        Self {
            addr,
            client,
            email_server,
            feed_server,
        }
    }

    pub fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", &self.addr, url);
        self.client.request(method, url)
    }

    pub async fn health_check(&self) -> reqwest::Result<Response> {
        self.request(Method::GET, "health_check").send().await
    }

    pub async fn newsletter_subscribe(&self, body: &Value) -> reqwest::Result<Response> {
        self.request(Method::POST, "api/newsletter")
            .json(body)
            .send()
            .await
    }

    pub async fn newsletter_subscribe_raw(&self, body: &str) -> reqwest::Result<Response> {
        self.request(Method::POST, "api/newsletter")
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
    }

    pub async fn contact_send(&self, body: &Value) -> reqwest::Result<Response> {
        self.request(Method::POST, "api/contact")
            .json(body)
            .send()
            .await
    }

    pub async fn contact_send_raw(&self, body: &str) -> reqwest::Result<Response> {
        self.request(Method::POST, "api/contact")
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
    }

    pub async fn posts(&self) -> reqwest::Result<Response> {
        self.request(Method::GET, "api/posts").send().await
    }

    /// JSON bodies of every request the mock email provider received
    pub async fn email_requests(&self) -> Vec<Value> {
        self.email_server
            .received_requests()
            .await
            .expect("Request recording is disabled")
            .iter()
            .map(|req| serde_json::from_slice(&req.body).expect("Email request body is not JSON"))
            .collect()
    }
}

/// Response status and JSON body
pub async fn status_and_body(res: Response) -> (reqwest::StatusCode, Value) {
    let status = res.status();
    let body = res.json().await.expect("Response body is not JSON");
    (status, body)
}
