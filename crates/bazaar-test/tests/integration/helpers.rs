#![allow(clippy::expect_used, dead_code)]
//! Test helpers for integration tests.
//!
//! Provides utilities for:
//! - Building an isolated application over an in-memory store
//! - Making HTTP requests with or without a bearer token
//! - Asserting on responses

use std::sync::Arc;

use salvo::http::{Method, StatusCode};
use salvo::prelude::*;
use salvo::test::{RequestBuilder, ResponseExt};
use serde_json::{Value, json};

use bazaar_test::component::config::Settings;
use bazaar_test::component::store::{MemoryStore, Store};

pub const SECRET: &str = "integration-secret-0123456789abcdef";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "adm1n-pass";

/// Settings with a fixed signing key and a bootstrap administrator.
pub fn test_settings() -> Settings {
    Settings::builder()
        .expect("defaults should apply")
        .set_override("auth.jwt_secret", SECRET)
        .expect("override")
        .set_override("auth.bootstrap_admin.username", ADMIN_USERNAME)
        .expect("override")
        .set_override("auth.bootstrap_admin.email", "admin@example.com")
        .expect("override")
        .set_override("auth.bootstrap_admin.password", ADMIN_PASSWORD)
        .expect("override")
        .build()
        .expect("config should build")
        .try_deserialize()
        .expect("config should deserialize")
}

/// One application instance with its own store.
pub struct TestApp {
    pub service: Service,
    pub store: Arc<MemoryStore>,
    pub settings: Settings,
}

impl TestApp {
    /// ## Summary
    /// Builds the router exactly as `main` does, after seeding roles and the
    /// bootstrap administrator.
    pub async fn new() -> Self {
        let settings = test_settings();
        settings.validate().expect("settings should be valid");

        let store = Arc::new(MemoryStore::new());
        bazaar_test::component::account::ensure_roles(store.as_ref(), &settings.auth)
            .await
            .expect("roles seeded");
        bazaar_test::component::account::ensure_bootstrap_admin(store.as_ref(), &settings.auth)
            .await
            .expect("admin seeded");

        let shared: Arc<dyn Store> = store.clone();
        let router = bazaar_test::app::router(&settings, shared).expect("router should build");

        Self {
            service: Service::new(router),
            store,
            settings,
        }
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> TestResponse {
        TestRequest::new(Method::POST, "/api/auth/register")
            .json(json!({ "username": username, "email": email, "password": password }))
            .send(self)
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        TestRequest::new(Method::POST, "/api/auth/login")
            .json(json!({ "username": username, "password": password }))
            .send(self)
            .await
    }

    /// Registers `username` and returns its session token.
    pub async fn user_token(&self, username: &str) -> String {
        self.register(username, &format!("{username}@example.com"), "passw0rd")
            .await
            .assert_status(StatusCode::OK)
            .text()
    }

    /// Logs in as the bootstrap administrator.
    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD)
            .await
            .assert_status(StatusCode::OK)
            .text()
    }
}

pub struct TestRequest {
    method: Method,
    path: String,
    token: Option<String>,
    body: Option<Value>,
}

impl TestRequest {
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            token: None,
            body: None,
        }
    }

    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Sends `Authorization: Bearer <token>`.
    #[must_use]
    pub fn bearer(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sends the request to the application and collects the response.
    pub async fn send(self, app: &TestApp) -> TestResponse {
        let url = format!("http://127.0.0.1:5800{}", self.path);
        let mut client = RequestBuilder::new(&url, self.method);

        if let Some(token) = self.token {
            client = client.add_header("authorization", format!("Bearer {token}"), true);
        }
        if let Some(body) = &self.body {
            client = client.json(body);
        }

        let mut response = client.send(&app.service).await;
        let status = response
            .status_code
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.take_string().await.unwrap_or_default();

        TestResponse { status, body }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TestResponse {
    /// Asserts that the response status matches the expected code.
    #[must_use]
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status, expected,
            "Expected status {expected} but got {} with body {}",
            self.status, self.body
        );
        self
    }

    /// Asserts a structured error body with the given category.
    #[must_use]
    pub fn assert_error(self, expected: StatusCode, category: &str) -> Self {
        let this = self.assert_status(expected);
        let json = this.json();
        assert_eq!(json["status"], expected.as_u16());
        assert_eq!(json["error"], category, "body: {json}");
        this
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.body.clone()
    }

    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("response body should be JSON")
    }
}
