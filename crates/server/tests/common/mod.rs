//! Common test utilities for in-process API testing.
//!
//! This module provides a test fixture that builds the router over a real
//! (in-memory or temp-file) memory store, so requests run end to end
//! without binding a port.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use spiral_core::{Config, MemoryStore, SqliteMemoryStore};
use spiral_server::api::{create_router, WsBroadcaster};
use spiral_server::state::AppState;

/// Test fixture for API testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_analyze() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/analyze", json!({ "text": "hello" })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Memory store shared with the router, if enabled
    pub memory: Option<Arc<dyn MemoryStore>>,
    /// Broadcaster shared with the router
    pub broadcaster: WsBroadcaster,
    /// Temporary directory backing the memory database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Fixture with default config and a file-backed memory store.
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    pub fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let mut config = test_config.config.unwrap_or_default();
        config.memory.path = temp_dir.path().join("memory.db");

        let memory: Option<Arc<dyn MemoryStore>> = if test_config.enable_memory {
            Some(Arc::new(
                SqliteMemoryStore::new(&config.memory.path)
                    .expect("Failed to create memory store"),
            ))
        } else {
            None
        };

        let broadcaster = WsBroadcaster::default();
        let state = Arc::new(AppState::new(
            config,
            memory.clone(),
            broadcaster.clone(),
        ));

        Self {
            router: create_router(state),
            memory,
            broadcaster,
            temp_dir,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

#[derive(Debug, Clone)]
pub struct TestConfig {
    pub config: Option<Config>,
    pub enable_memory: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            config: None,
            enable_memory: true,
        }
    }
}

impl TestConfig {
    pub fn without_memory() -> Self {
        Self {
            enable_memory: false,
            ..Default::default()
        }
    }

    /// Low thresholds so ordinary text is accepted on the first pass.
    pub fn lenient() -> Self {
        let mut config = Config::default();
        config.pipeline.confidence_threshold = 0.1;
        config.pipeline.success_threshold = 0.1;
        Self {
            config: Some(config),
            enable_memory: true,
        }
    }
}

/// Assert that a response has the expected status code
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $expected:expr) => {
        assert_eq!(
            $response.status, $expected,
            "Expected status {}, got {}. Body: {}",
            $expected, $response.status, $response.text
        );
    };
}
