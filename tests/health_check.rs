//! Public, unauthenticated endpoints

mod common;

use common::spawn_app;
use serde_json::Value;

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app();

    let response = app
        .client
        .get(app.url("/health_check"))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}

#[tokio::test]
async fn index_returns_greeting() {
    let app = spawn_app();

    let response = app
        .client
        .get(app.url("/"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Hello, you've reached the authentication server"));
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = spawn_app();

    let response = app
        .client
        .get(app.url("/health_check"))
        .header("x-request-id", "trace-me-42")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "trace-me-42"
    );

    // Rejected by the session gate
    let response = app
        .client
        .get(app.url("/api/me"))
        .header("x-request-id", "trace-me-43")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(401, response.status().as_u16());
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "trace-me-43"
    );
}
