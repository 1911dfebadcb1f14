//! Common test utilities for in-process HTTP testing.
//!
//! This module provides a test fixture that builds the router over a
//! temporary transcripts directory, so requests run without binding a port.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use middleman_core::{load_config_from_str, Config, FsTranscriptPublisher};
use middleman_server::{create_router, AppState};

/// Re-export fixtures for test convenience
#[allow(unused_imports)]
pub use middleman_core::testing::fixtures;

/// Base URL the fixture's publisher hands out.
pub const BASE_URL: &str = "http://transcripts.test";

/// Test fixture for HTTP testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_index() {
///     let fixture = TestFixture::new();
///     let response = fixture.get("/").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Publisher writing into the served directory
    pub publisher: FsTranscriptPublisher,
    /// Temporary directory holding the transcripts
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub text: String,
    pub body: Value,
}

pub fn test_config() -> Config {
    load_config_from_str(
        r#"
[bot]
token = "super-secret-token"
command_prefix = "!"

[server]
host = "127.0.0.1"
port = 5999
"#,
    )
    .expect("test config parses")
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let state =
            Arc::new(AppState::new(test_config()).with_transcripts_dir(temp_dir.path()));
        let router = create_router(state);
        let publisher = FsTranscriptPublisher::new(temp_dir.path(), BASE_URL);

        Self {
            router,
            publisher,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            content_type,
            text,
            body,
        }
    }
}
