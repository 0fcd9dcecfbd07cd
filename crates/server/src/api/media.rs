//! Search, browse and detail handlers for VODs and series.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use lionz_core::query::{DEFAULT_LIMIT, DEFAULT_PAGE};
use lionz_core::{CombinedResults, QueryError, SeriesInfo, VodInfo};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

#[derive(Debug, Serialize)]
pub struct HitsResponse {
    pub page: u32,
    pub limit: u32,
    pub hits: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct CombinedResponse {
    pub query: String,
    pub page: u32,
    pub limit: u32,
    #[serde(flatten)]
    pub results: CombinedResults,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn query_error(e: QueryError) -> ApiError {
    match e {
        QueryError::InvalidPagination(_) => error_response(StatusCode::BAD_REQUEST, e),
        QueryError::NotFound(_) => error_response(StatusCode::NOT_FOUND, e),
        QueryError::Index(_) | QueryError::Catalog(_) => {
            warn!(error = %e, "Read request failed downstream");
            error_response(StatusCode::BAD_GATEWAY, e)
        }
    }
}

fn hits(
    page: u32,
    limit: u32,
    result: Result<Vec<Value>, QueryError>,
) -> Result<Json<HitsResponse>, ApiError> {
    result
        .map(|hits| Json(HitsResponse { page, limit, hits }))
        .map_err(query_error)
}

// ============================================================================
// Search
// ============================================================================

/// GET /api/v1/search
pub async fn search_all(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<CombinedResponse>, ApiError> {
    let results = state
        .query()
        .search_all(&params.query, params.page, params.limit)
        .await
        .map_err(query_error)?;

    Ok(Json(CombinedResponse {
        query: params.query,
        page: params.page,
        limit: params.limit,
        results,
    }))
}

/// GET /api/v1/vods/search
pub async fn search_vods(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<HitsResponse>, ApiError> {
    let result = state
        .query()
        .search_vods(&params.query, params.page, params.limit)
        .await;
    hits(params.page, params.limit, result)
}

/// GET /api/v1/series/search
pub async fn search_series(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<HitsResponse>, ApiError> {
    let result = state
        .query()
        .search_series(&params.query, params.page, params.limit)
        .await;
    hits(params.page, params.limit, result)
}

// ============================================================================
// Browse
// ============================================================================

/// GET /api/v1/vods
pub async fn list_vods(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<Json<HitsResponse>, ApiError> {
    let result = state.query().list_vods(params.page, params.limit).await;
    hits(params.page, params.limit, result)
}

/// GET /api/v1/series
pub async fn list_series(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<Json<HitsResponse>, ApiError> {
    let result = state.query().list_series(params.page, params.limit).await;
    hits(params.page, params.limit, result)
}

// ============================================================================
// Details
// ============================================================================

/// GET /api/v1/vods/{id}
pub async fn get_vod(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<VodInfo>, ApiError> {
    state.query().vod_info(id).await.map(Json).map_err(query_error)
}

/// GET /api/v1/series/{id}
///
/// Seasons are synthesized from the episode map when the provider omits them.
pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<SeriesInfo>, ApiError> {
    state
        .query()
        .series_info(id)
        .await
        .map(Json)
        .map_err(query_error)
}
