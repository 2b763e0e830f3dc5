//! Shared harness: spawns the real server on a random port with an in-memory
//! credential store and a manually driven clock.

#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

use gatekeeper::auth::{AuthService, PasswordHasher, TokenService};
use gatekeeper::clock::ManualClock;
use gatekeeper::configuration::SigningSecret;
use gatekeeper::startup::{run, AppState};
use gatekeeper::store::InMemoryCredentialStore;

pub const TOKEN_TTL_SECONDS: i64 = 900;

pub struct TestApp {
    pub address: String,
    pub clock: Arc<ManualClock>,
    pub client: reqwest::Client,
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let tokens = TokenService::new(
        &SigningSecret::new("integration-test-secret-at-least-32-chars"),
        Duration::seconds(TOKEN_TTL_SECONDS),
        "gatekeeper-test",
    )
    .expect("Failed to build token service");
    let hasher = PasswordHasher::new(4).expect("Failed to build password hasher");
    let clock = Arc::new(ManualClock::new(start_time()));

    let state = AppState {
        auth: Arc::new(AuthService::new(
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(tokens),
            hasher,
        )),
        clock: clock.clone(),
    };

    let server = run(listener, state).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        clock,
        client: reqwest::Client::new(),
    }
}

pub fn start_time() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_register(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/register"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_refresh(&self, token: &str) -> reqwest::Response {
        self.client
            .get(self.url("/auth/refresh"))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Register then log in, returning the access token
    pub async fn login_as(&self, username: &str, password: &str) -> String {
        let response = self.post_register(username, password).await;
        assert_eq!(200, response.status().as_u16());

        let response = self.post_login(username, password).await;
        assert_eq!(200, response.status().as_u16());
        let body: Value = response.json().await.expect("Failed to parse response");
        body["access_token"]
            .as_str()
            .expect("No access token in response")
            .to_string()
    }
}

/// Change one character in the middle of the token's payload segment
pub fn tamper(token: &str) -> String {
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3, "not a compact JWS");
    let mut payload: Vec<char> = parts[1].chars().collect();
    let mid = payload.len() / 2;
    payload[mid] = if payload[mid] == 'A' { 'B' } else { 'A' };
    format!("{}.{}.{}", parts[0], payload.into_iter().collect::<String>(), parts[2])
}
