use reqwest::StatusCode;

use serde_json::{json, Value};

use wiremock::matchers::*;
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{status_and_body, TestApp, CONTACT_INBOX};

const SEND_FAILED: &str = "Unable to send your message. Please try again later.";

async fn mount_email_sent(app: &TestApp, expected_calls: u64) {
    Mock::given(path("/emails"))
        .and(method("POST"))
        .and(header("Authorization", "Bearer TestAuthorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "e-1" })))
        .expect(expected_calls)
        .mount(&app.email_server)
        .await;
}

async fn mount_no_calls(app: &TestApp) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;
}

fn valid_contact() -> Value {
    json!({
        "name": "John Doe",
        "email": "john@example.com",
        "message": "Hello",
    })
}

#[tokio::test]
async fn contact_returns_success_for_valid_message() {
    let app = TestApp::spawn().await;
    mount_email_sent(&app, 1).await;

    let res = app
        .contact_send(&valid_contact())
        .await
        .expect("Failed to execute request");

    let (status, body) = status_and_body(res).await;

    assert_eq!(StatusCode::OK, status);
    assert_eq!(
        json!({
            "success": true,
            "message": "Thank you for your message. We will get back to you soon.",
        }),
        body
    );
}

#[tokio::test]
async fn contact_sends_trimmed_fields_to_inbox() {
    let app = TestApp::spawn().await;
    mount_email_sent(&app, 1).await;

    let res = app
        .contact_send(&json!({
            "name": "  John Doe  ",
            "email": "  John@Example.COM ",
            "message": "  Hello there  ",
        }))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());

    let requests = app.email_requests().await;
    let email = &requests[0];

    assert_eq!(json!([CONTACT_INBOX]), email["to"]);
    assert_eq!("site@test.com", email["from"]);
    assert_eq!("john@example.com", email["reply_to"]);

    let subject = email["subject"].as_str().unwrap();
    let html = email["html"].as_str().unwrap();
    let text = email["text"].as_str().unwrap();

    assert!(subject.contains("John Doe"));
    assert!(!subject.contains("  John Doe  "));
    for body in [html, text] {
        assert!(body.contains("John Doe"));
        assert!(!body.contains("  John Doe  "));
        assert!(body.contains("john@example.com"));
        assert!(body.contains("Hello there"));
        assert!(!body.contains("  Hello there  "));
    }
}

#[tokio::test]
async fn contact_honeypot_is_silently_accepted() {
    let app = TestApp::spawn().await;
    mount_no_calls(&app).await;

    let test_cases = vec![
        json!({
            "name": "John Doe",
            "email": "john@example.com",
            "message": "Hello",
            "website": "http://spam.com",
        }),
        json!({ "website": "http://spam.com" }),
        json!({ "name": "", "email": "not-an-email", "website": "x" }),
        json!({ "name": 1, "email": 2, "message": 3, "website": true }),
    ];

    for payload in test_cases {
        let res = app
            .contact_send(&payload)
            .await
            .expect("Failed to execute request");

        let (status, body) = status_and_body(res).await;

        assert_eq!(StatusCode::OK, status, "payload was {}", payload);
        assert_eq!(json!({ "success": true }), body);
    }
}

#[tokio::test]
async fn contact_empty_honeypot_is_ignored() {
    let app = TestApp::spawn().await;
    mount_email_sent(&app, 1).await;

    let mut payload = valid_contact();
    payload["website"] = json!("");

    let res = app
        .contact_send(&payload)
        .await
        .expect("Failed to execute request");

    let (status, body) = status_and_body(res).await;

    assert_eq!(StatusCode::OK, status);
    assert_eq!(
        "Thank you for your message. We will get back to you soon.",
        body["message"]
    );
}

#[tokio::test]
async fn contact_validates_fields_in_order() {
    let app = TestApp::spawn().await;
    mount_no_calls(&app).await;

    let test_cases: Vec<(Value, &str)> = vec![
        (json!({}), "Name is required"),
        (
            json!({ "email": "john@example.com", "message": "Hello" }),
            "Name is required",
        ),
        (
            json!({ "name": "   ", "email": "bad", "message": "" }),
            "Name is required",
        ),
        (
            json!({ "name": "John", "message": "Hello" }),
            "Email is required",
        ),
        (
            json!({ "name": "John", "email": 42, "message": "Hello" }),
            "Email is required",
        ),
        (
            json!({ "name": "John", "email": "   ", "message": "" }),
            "Email is required",
        ),
        (
            json!({ "name": "John", "email": "john.example.com", "message": "Hello" }),
            "Invalid email format",
        ),
        (
            json!({ "name": "John", "email": "john@", "message": "" }),
            "Invalid email format",
        ),
        (
            json!({ "name": "John", "email": "john@example.com" }),
            "Message is required",
        ),
        (
            json!({ "name": "John", "email": "john@example.com", "message": " \n " }),
            "Message is required",
        ),
    ];

    for (payload, expected_error) in test_cases {
        let res = app
            .contact_send(&payload)
            .await
            .expect("Failed to execute request");

        let (status, body) = status_and_body(res).await;

        assert_eq!(StatusCode::BAD_REQUEST, status, "payload was {}", payload);
        assert_eq!(
            json!({ "success": false, "error": expected_error }),
            body,
            "payload was {}",
            payload
        );
    }
}

#[tokio::test]
async fn contact_rejects_invalid_body() {
    let app = TestApp::spawn().await;
    mount_no_calls(&app).await;

    let res = app
        .contact_send_raw("not valid json")
        .await
        .expect("Failed to execute request");

    let (status, body) = status_and_body(res).await;

    assert_eq!(StatusCode::BAD_REQUEST, status);
    assert_eq!(json!({ "success": false, "error": "Invalid request body" }), body);
}

#[tokio::test]
async fn contact_rejects_oversized_body_with_json() {
    let app = TestApp::spawn().await;
    mount_no_calls(&app).await;

    let res = app
        .contact_send(&json!({
            "name": "John Doe",
            "email": "john@example.com",
            "message": "a".repeat(300_000),
        }))
        .await
        .expect("Failed to execute request");

    let (status, body) = status_and_body(res).await;

    assert_eq!(StatusCode::PAYLOAD_TOO_LARGE, status);
    assert_eq!(
        json!({ "success": false, "error": "Request body is too large" }),
        body
    );
}

#[tokio::test]
async fn contact_hides_provider_errors() {
    let app = TestApp::spawn().await;

    Mock::given(path("/emails"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "statusCode": 403,
            "name": "invalid_from_address",
            "message": "Domain is not verified",
        })))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let res = app
        .contact_send(&valid_contact())
        .await
        .expect("Failed to execute request");

    let (status, body) = status_and_body(res).await;

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, status);
    assert_eq!(json!({ "success": false, "error": SEND_FAILED }), body);
}

#[tokio::test]
async fn contact_fails_without_api_key() {
    let app = TestApp::spawn_unconfigured().await;
    mount_no_calls(&app).await;

    let res = app
        .contact_send(&valid_contact())
        .await
        .expect("Failed to execute request");

    let (status, body) = status_and_body(res).await;

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, status);
    assert_eq!(json!({ "success": false, "error": SEND_FAILED }), body);
}
