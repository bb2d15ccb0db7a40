//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use imasu_api::{AppState, build_router};
use imasu_core::config::{AppConfig, StoreBackend};
use imasu_database::{MemoryPresenceStore, PresenceStore};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// The store behind the router, for direct assertions
    pub store: Arc<dyn PresenceStore>,
}

/// Captured response
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// The `data` field of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

impl TestApp {
    /// Create a new test application on a fresh in-memory store
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.backend = StoreBackend::Memory;
        config.auth.jwt_secret = "integration-test-secret-0123456789".to_string();
        config.presence.storage_retry_backoff_ms = 1;

        let store: Arc<dyn PresenceStore> = Arc::new(MemoryPresenceStore::new());
        let router = build_router(AppState::new(config, Arc::clone(&store)));

        Self { router, store }
    }

    /// Register a member and return their access token.
    pub async fn register(&self, email: &str, display_name: Option<&str>) -> String {
        let response = self
            .request(
                "POST",
                "/api/users",
                Some(serde_json::json!({
                    "email": email,
                    "password": "password123",
                    "display_name": display_name,
                })),
                None,
            )
            .await;

        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.data()["token"]["access_token"]
            .as_str()
            .expect("token in registration response")
            .to_string()
    }

    /// POST an action to the caller's log.
    pub async fn act(&self, token: &str, action: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/users/me/logs",
            Some(serde_json::json!({ "action": action })),
            Some(token),
        )
        .await
    }

    /// The caller's history, newest first.
    pub async fn logs(&self, token: &str) -> Vec<Value> {
        let response = self
            .request("GET", "/api/users/me/logs", None, Some(token))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.data().as_array().cloned().unwrap_or_default()
    }

    /// Send a JSON request through the router.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        self.send(req.body(Body::from(body_str)).expect("Failed to build request"))
            .await
    }

    /// Send a form-encoded request through the router.
    pub async fn request_form(&self, path: &str, form: &str) -> TestResponse {
        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .expect("Failed to build request");

        self.send(req).await
    }

    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}
