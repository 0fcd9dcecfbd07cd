//! End-to-end tests with mocked external dependencies.
//!
//! These tests run the full router in-process with mock implementations
//! for the catalog provider, the search store and the download manager.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use lionz_core::testing::{MockCatalogSource, MOCK_BASE_URL};
use lionz_core::{CatalogError, DownloadError, IndexError, SearchIndex};
use serde_json::json;

use common::{fixtures, TestFixture};

fn catalog() -> MockCatalogSource {
    MockCatalogSource::new()
        .with_vods(vec![
            fixtures::vod(1, "Dune"),
            fixtures::vod(2, "Dune: Part Two"),
            fixtures::vod(3, "Alien"),
        ])
        .with_series(vec![
            fixtures::series(10, "The Expanse"),
            fixtures::series(11, "Dune: Prophecy"),
        ])
        .with_series_info(10, fixtures::series_info_without_seasons("The Expanse", &[2, 1]))
        .with_vod_info(1, fixtures::vod_info(1, "Dune"))
}

async fn synced_fixture() -> TestFixture {
    let fixture = TestFixture::with_catalog(catalog()).await;
    let response = fixture.post("/api/v1/index/sync", json!({})).await;
    assert_status!(response, StatusCode::OK);
    fixture
}

// =============================================================================
// Basic API Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/config").await;

    assert_status!(response, StatusCode::OK);
    assert!(!response.text.contains("\"pass\""));
    assert_eq!(response.body["xtream"]["username"], "user");
    assert_eq!(response.body["xtream"]["password_configured"], true);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/health").await;

    let response = fixture.get("/metrics").await;
    assert_status!(response, StatusCode::OK);
    assert!(response.text.contains("lionz_http_requests_total"));
    assert!(response.text.contains("lionz_sync_running"));
}

// =============================================================================
// Sync
// =============================================================================

#[tokio::test]
async fn test_sync_reports_both_collections() {
    let fixture = TestFixture::with_catalog(catalog()).await;

    let response = fixture.post("/api/v1/index/sync", json!({})).await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["complete"], true);
    assert_eq!(response.body["movies"]["status"], "indexed");
    assert_eq!(response.body["movies"]["documents"], 3);
    assert_eq!(response.body["series"]["documents"], 2);
    assert_eq!(fixture.index.document_count("movies").await, Some(3));
}

#[tokio::test]
async fn test_sync_partial_failure_still_returns_report() {
    let source = catalog().with_series_error(CatalogError::Timeout);
    let fixture = TestFixture::with_catalog(source).await;

    let response = fixture.post("/api/v1/index/sync", json!({})).await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["complete"], false);
    assert_eq!(response.body["series"]["status"], "failed");
    assert_eq!(response.body["series"]["stage"], "fetch");
    assert_eq!(response.body["movies"]["status"], "indexed");
    assert_eq!(fixture.index.document_count("series").await, Some(0));
}

#[tokio::test]
async fn test_sync_with_unhealthy_store_is_503() {
    let fixture = TestFixture::with_catalog(catalog()).await;
    fixture
        .index
        .set_health_error(Some(IndexError::Unavailable("connection refused".to_string())))
        .await;

    let response = fixture.post("/api/v1/index/sync", json!({})).await;

    assert_status!(response, StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.body["error"].as_str().unwrap().contains("unavailable"));
}

#[tokio::test]
async fn test_concurrent_sync_is_409() {
    let source = catalog().with_listing_delay(Duration::from_millis(200));
    let fixture = TestFixture::with_catalog(source).await;

    let (first, second) = tokio::join!(
        fixture.post("/api/v1/index/sync", json!({})),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            fixture.post("/api/v1/index/sync", json!({})).await
        }
    );

    assert_status!(first, StatusCode::OK);
    assert_status!(second, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_sync_status_keeps_last_report() {
    let fixture = TestFixture::with_catalog(catalog()).await;

    let before = fixture.get("/api/v1/index/sync").await;
    assert_status!(before, StatusCode::OK);
    assert_eq!(before.body["running"], false);
    assert!(before.body["last_report"].is_null());

    fixture.post("/api/v1/index/sync", json!({})).await;

    let after = fixture.get("/api/v1/index/sync").await;
    assert_eq!(after.body["last_report"]["complete"], true);
}

// =============================================================================
// Search and browse
// =============================================================================

#[tokio::test]
async fn test_search_empty_index_returns_empty_hits() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/vods/search?query=").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["hits"], json!([]));
    assert_eq!(response.body["page"], 1);
    assert_eq!(response.body["limit"], 10);
}

#[tokio::test]
async fn test_search_vods_after_sync() {
    let fixture = synced_fixture().await;

    let response = fixture.get("/api/v1/vods/search?query=dune").await;

    assert_status!(response, StatusCode::OK);
    let hits = response.body["hits"].as_array().unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h["name"].as_str().unwrap().contains("Dune")));
}

#[tokio::test]
async fn test_search_page_maps_to_offset() {
    let fixture = synced_fixture().await;

    let response = fixture
        .get("/api/v1/series/search?query=the&page=2&limit=10")
        .await;

    assert_status!(response, StatusCode::OK);
    let (uid, request) = fixture.index.last_search().await.unwrap();
    assert_eq!(uid, "series");
    assert_eq!(request.offset, 10);
    assert_eq!(request.limit, 10);
}

#[tokio::test]
async fn test_combined_search() {
    let fixture = synced_fixture().await;

    let response = fixture.get("/api/v1/search?query=dune").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["query"], "dune");
    assert_eq!(response.body["vods"].as_array().unwrap().len(), 2);
    assert_eq!(response.body["series"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_pagination_is_400() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/vods/search?query=x&page=0").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());

    let response = fixture.get("/api/v1/series?limit=500").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_browse_vods() {
    let fixture = synced_fixture().await;

    let first = fixture.get("/api/v1/vods?page=1&limit=2").await;
    let second = fixture.get("/api/v1/vods?page=2&limit=2").await;

    assert_status!(first, StatusCode::OK);
    assert_eq!(first.body["hits"].as_array().unwrap().len(), 2);
    assert_eq!(second.body["hits"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_missing_collection_is_502() {
    let fixture = TestFixture::new().await;
    fixture.index.delete_index("movies").await.unwrap();

    let response = fixture.get("/api/v1/vods/search?query=dune").await;

    assert_status!(response, StatusCode::BAD_GATEWAY);
    assert!(response.body["error"].is_string());
}

// =============================================================================
// Details
// =============================================================================

#[tokio::test]
async fn test_series_details_synthesize_seasons() {
    let fixture = TestFixture::with_catalog(catalog()).await;

    let response = fixture.get("/api/v1/series/10").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(
        response.body["seasons"],
        json!([
            {"name": "Season 1", "episode_count": 2, "season_number": 1},
            {"name": "Season 2", "episode_count": 1, "season_number": 2}
        ])
    );
    assert_eq!(
        response.body["episodes"]["1"][0]["added_display"],
        "2023-11-14 22:13:20"
    );
}

#[tokio::test]
async fn test_vod_details() {
    let fixture = TestFixture::with_catalog(catalog()).await;

    let response = fixture.get("/api/v1/vods/1").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["movie_data"]["name"], "Dune");
}

#[tokio::test]
async fn test_unknown_details_are_404() {
    let fixture = TestFixture::with_catalog(catalog()).await;

    assert_status!(fixture.get("/api/v1/series/999").await, StatusCode::NOT_FOUND);
    assert_status!(fixture.get("/api/v1/vods/999").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_failure_on_details_is_502() {
    let source = catalog().with_detail_error(CatalogError::Connection("reset".to_string()));
    let fixture = TestFixture::with_catalog(source).await;

    let response = fixture.get("/api/v1/vods/1").await;
    assert_status!(response, StatusCode::BAD_GATEWAY);
}

// =============================================================================
// Downloads
// =============================================================================

#[tokio::test]
async fn test_submit_vod_download() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/downloads",
            json!([{
                "kind": "vod",
                "stream_id": 1,
                "name": "Dune",
                "container_extension": "mkv"
            }]),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["downloads"][0]["out"], "movies/Dune/Dune.mkv");

    let added = fixture.downloader.added().await;
    assert_eq!(added.len(), 1);
    assert_eq!(
        added[0].uri,
        format!("{}/movie/user/pass/1.mkv", MOCK_BASE_URL)
    );
}

#[tokio::test]
async fn test_submit_episode_batch() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/downloads",
            json!([
                {
                    "kind": "series",
                    "stream_id": 1001,
                    "name": "Show",
                    "container_extension": "mkv",
                    "season": 1,
                    "episode_title": "S01E01"
                },
                {
                    "kind": "series",
                    "stream_id": 1002,
                    "name": "Show",
                    "container_extension": "mkv",
                    "season": 1,
                    "episode_title": "S01E02"
                }
            ]),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    let added = fixture.downloader.added().await;
    assert_eq!(added.len(), 2);
    assert_eq!(added[0].out, "shows/Show/Season 01/S01E01.mkv");
    assert_eq!(
        added[1].uri,
        format!("{}/series/user/pass/1002.mkv", MOCK_BASE_URL)
    );
}

#[tokio::test]
async fn test_invalid_job_rejects_whole_batch() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/downloads",
            json!([
                {"kind": "vod", "stream_id": 1, "name": "Dune", "container_extension": "mkv"},
                {"kind": "series", "stream_id": 5, "name": "X", "container_extension": "mkv"}
            ]),
        )
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["status"], "error");
    assert!(response.body["message"].as_str().unwrap().contains("job 1"));
    assert!(fixture.downloader.added().await.is_empty());
}

#[tokio::test]
async fn test_downloader_failure_is_500() {
    let fixture = TestFixture::new().await;
    fixture
        .downloader
        .set_next_error(DownloadError::Connection("refused".to_string()))
        .await;

    let response = fixture
        .post(
            "/api/v1/downloads",
            json!([{"kind": "vod", "stream_id": 1, "name": "Dune", "container_extension": "mkv"}]),
        )
        .await;

    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["status"], "error");
}

#[tokio::test]
async fn test_empty_batch_is_400() {
    let fixture = TestFixture::new().await;
    let response = fixture.post("/api/v1/downloads", json!([])).await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_download_body_is_rejected() {
    let fixture = TestFixture::new().await;
    let response = fixture.post_raw("/api/v1/downloads", "{not json").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["status"], "error");
}

#[tokio::test]
async fn test_job_missing_fields_is_400() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/downloads",
            json!([{"kind": "vod", "stream_id": 1, "name": "Dune"}]),
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["status"], "error");
    assert!(response.body["message"]
        .as_str()
        .unwrap()
        .contains("container_extension"));

    let response = fixture
        .post(
            "/api/v1/downloads",
            json!([{
                "kind": "series",
                "stream_id": 5,
                "name": "Show",
                "container_extension": "mkv",
                "season": "one",
                "episode_title": "Pilot"
            }]),
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["status"], "error");
    assert!(fixture.downloader.added().await.is_empty());
}

#[tokio::test]
async fn test_traversing_extension_is_400() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/downloads",
            json!([{
                "kind": "vod",
                "stream_id": 1,
                "name": "Dune",
                "container_extension": "mkv/../../../etc/evil"
            }]),
        )
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["status"], "error");
    assert!(fixture.downloader.added().await.is_empty());
}

#[tokio::test]
async fn test_download_status() {
    let fixture = TestFixture::new().await;
    let submitted = fixture
        .post(
            "/api/v1/downloads",
            json!([{"kind": "vod", "stream_id": 1, "name": "Dune", "container_extension": "mkv"}]),
        )
        .await;
    let gid = submitted.body["downloads"][0]["gid"].as_str().unwrap().to_string();

    fixture.downloader.set_progress(&gid, 500, 1000).await;
    let response = fixture.get(&format!("/api/v1/downloads/{}", gid)).await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "active");
    assert_eq!(response.body["completed_length"], 500);

    let missing = fixture.get("/api/v1/downloads/ffffffffffffffff").await;
    assert_status!(missing, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_status_rpc_failure_is_502() {
    let fixture = TestFixture::new().await;
    fixture
        .downloader
        .set_next_error(DownloadError::Rpc {
            code: 1,
            message: "Unauthorized".to_string(),
        })
        .await;

    let response = fixture.get("/api/v1/downloads/2089b05ecca3d829").await;

    assert_status!(response, StatusCode::BAD_GATEWAY);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("Unauthorized"));
}

// =============================================================================
// Favorites
// =============================================================================

#[tokio::test]
async fn test_favorite_toggle_cycle() {
    let fixture = TestFixture::new().await;
    let favorite = json!({
        "kind": "series",
        "stream_id": 10,
        "name": "The Expanse",
        "image": "http://img.example/s10.jpg"
    });

    let added = fixture.post("/api/v1/favorites/toggle", favorite.clone()).await;
    assert_status!(added, StatusCode::OK);
    assert_eq!(added.body["action"], "added");
    assert_eq!(added.body["favorite"]["name"], "The Expanse");

    let check = fixture.get("/api/v1/favorites/series/10").await;
    assert_eq!(check.body["favorite"], true);

    let list = fixture.get("/api/v1/favorites").await;
    assert_eq!(list.body["total"], 1);

    let removed = fixture.post("/api/v1/favorites/toggle", favorite).await;
    assert_eq!(removed.body["action"], "removed");

    let check = fixture.get("/api/v1/favorites/series/10").await;
    assert_eq!(check.body["favorite"], false);
}

#[tokio::test]
async fn test_remove_favorite() {
    let fixture = TestFixture::new().await;
    fixture
        .post(
            "/api/v1/favorites/toggle",
            json!({"kind": "vod", "stream_id": 1, "name": "Dune"}),
        )
        .await;

    let response = fixture.delete("/api/v1/favorites/vod/1").await;
    assert_status!(response, StatusCode::NO_CONTENT);

    let again = fixture.delete("/api/v1/favorites/vod/1").await;
    assert_status!(again, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favorite_unknown_kind_is_400() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/favorites/live/1").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}
