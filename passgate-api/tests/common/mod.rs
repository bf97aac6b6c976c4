//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - Router built around an in-memory directory with one user
//! - Token generation through the app's own codec
//! - Request/response helpers

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use passgate_api::app::{build_router, AppState};
use passgate_api::config::{AuthConfig, Config, ServerConfig, UserEntry};
use passgate_api::directory::InMemoryDirectory;
use passgate_shared::auth::identity::Identity;
use passgate_shared::auth::password::hash_password;
use serde_json::Value;
use std::sync::Arc;
use tower::Service as _;

pub const SECRET: &str = "api-test-secret-key-at-least-32-bytes";
pub const LOGIN: &str = "alice";
pub const PASSWORD: &str = "wonderland";
pub const USER_ID: &str = "u1";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: axum::Router,
    pub state: AppState,
}

impl TestContext {
    /// Router with user `alice` / `wonderland` (id `u1`)
    pub fn new() -> Self {
        let config = test_config(vec![UserEntry {
            id: USER_ID.to_string(),
            login: LOGIN.to_string(),
            password_hash: hash_password(PASSWORD).unwrap(),
            name: Some("Alice".to_string()),
        }]);

        let directory = InMemoryDirectory::new(config.auth.users.clone()).unwrap();
        let state = AppState::new(config, Arc::new(directory));

        Self {
            app: build_router(state.clone()),
            state,
        }
    }

    /// Access token for the test user
    pub fn access_token(&self) -> String {
        self.state.codec().mint_access_token(&self.identity()).unwrap()
    }

    /// Refresh token for the test user
    pub fn refresh_token(&self) -> String {
        self.state.codec().mint_refresh_token(&self.identity()).unwrap()
    }

    pub fn identity(&self) -> Identity {
        Identity::new(USER_ID)
    }

    /// Sends a request through the router
    pub async fn send(&mut self, request: Request<Body>) -> Response<Body> {
        self.app.call(request).await.unwrap()
    }
}

pub fn test_config(users: Vec<UserEntry>) -> Config {
    Config {
        server: ServerConfig::default(),
        auth: AuthConfig {
            jwt_secret: SECRET.to_string(),
            access_token_ttl_secs: 3 * 60 * 60,
            refresh_token_ttl_secs: 7 * 24 * 60 * 60,
            users,
        },
    }
}

pub fn login_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Status and JSON body of a response
pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
