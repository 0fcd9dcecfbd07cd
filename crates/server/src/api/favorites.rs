//! Favorites API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use lionz_core::{FavoriteError, FavoriteItem, MediaKind, NewFavorite, ToggleOutcome};
use serde::Serialize;

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<FavoriteItem>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct FavoriteCheckResponse {
    pub kind: MediaKind,
    pub stream_id: u64,
    pub favorite: bool,
}

fn favorite_error(e: FavoriteError) -> ApiError {
    match e {
        FavoriteError::NotFound { .. } => error_response(StatusCode::NOT_FOUND, e),
        FavoriteError::Database(_) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

fn parse_kind(kind: &str) -> Result<MediaKind, ApiError> {
    kind.parse::<MediaKind>()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e))
}

/// GET /api/v1/favorites
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FavoritesResponse>, ApiError> {
    let favorites = state.favorites().list().map_err(favorite_error)?;
    let total = favorites.len();
    Ok(Json(FavoritesResponse { favorites, total }))
}

/// POST /api/v1/favorites/toggle
pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewFavorite>,
) -> Result<Json<ToggleOutcome>, ApiError> {
    if request.name.trim().is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "name is required"));
    }
    state
        .favorites()
        .toggle(request)
        .map(Json)
        .map_err(favorite_error)
}

/// GET /api/v1/favorites/{kind}/{stream_id}
pub async fn get_favorite(
    State(state): State<Arc<AppState>>,
    Path((kind, stream_id)): Path<(String, u64)>,
) -> Result<Json<FavoriteCheckResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let favorite = state
        .favorites()
        .is_favorite(kind, stream_id)
        .map_err(favorite_error)?;
    Ok(Json(FavoriteCheckResponse {
        kind,
        stream_id,
        favorite,
    }))
}

/// DELETE /api/v1/favorites/{kind}/{stream_id}
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Path((kind, stream_id)): Path<(String, u64)>,
) -> Result<StatusCode, ApiError> {
    let kind = parse_kind(&kind)?;
    state
        .favorites()
        .remove(kind, stream_id)
        .map_err(favorite_error)?;
    Ok(StatusCode::NO_CONTENT)
}
