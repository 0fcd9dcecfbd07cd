//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling E2E testing without a catalog
//! provider, a search store or a download manager.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use lionz_core::{
    load_config_from_str,
    testing::{MockCatalogSource, MockDownloader, MockSearchIndex},
    CatalogSync, DownloadDispatcher, FavoriteStore, MediaQuery, SqliteFavoriteStore,
};
use lionz_server::state::AppState;

/// Re-export fixtures for test convenience
pub use lionz_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::with_catalog(
///         MockCatalogSource::new().with_vods(vec![fixtures::vod(1, "Dune")]),
///     )
///     .await;
///     fixture.post("/api/v1/index/sync", json!({})).await;
///
///     let response = fixture.get("/api/v1/vods/search?query=dune").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalog source - configure listings and details
    pub source: Arc<MockCatalogSource>,
    /// Mock search index - inspect collections
    pub index: Arc<MockSearchIndex>,
    /// Mock downloader - inspect submissions, control progress
    pub downloader: Arc<MockDownloader>,
    /// Temporary directory for the favorites database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

const TEST_CONFIG: &str = r#"
[xtream]
host = "http://mock.example"
port = 8080
username = "user"
password = "pass"
"#;

impl TestFixture {
    /// Create a fixture with an empty catalog and empty collections.
    pub async fn new() -> Self {
        Self::with_catalog(MockCatalogSource::new()).await
    }

    /// Create a fixture around a configured catalog source.
    pub async fn with_catalog(source: MockCatalogSource) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("favorites.db");

        let mut config = load_config_from_str(TEST_CONFIG).expect("Failed to parse test config");
        config.database.path = db_path.clone();

        let source = Arc::new(source);
        let index = Arc::new(MockSearchIndex::new());
        index.create("movies", "stream_id").await;
        index.create("series", "series_id").await;
        let downloader = Arc::new(MockDownloader::new());
        let favorites: Arc<dyn FavoriteStore> = Arc::new(
            SqliteFavoriteStore::new(&db_path).expect("Failed to create favorites store"),
        );

        let sync = Arc::new(CatalogSync::new(
            source.clone(),
            index.clone(),
            config.sync.clone(),
        ));
        let query = MediaQuery::new(source.clone(), index.clone());
        let dispatcher = DownloadDispatcher::new(source.clone(), downloader.clone());

        let state = Arc::new(AppState::new(config, sync, query, dispatcher, favorites));
        let router = lionz_server::api::create_router(state);

        Self {
            router,
            source,
            index,
            downloader,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
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

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}
