//! Download submission and status handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use lionz_core::{DownloadError, DownloadJob, DownloadStatus, JobHandle};
use serde::Serialize;
use tracing::{info, warn};

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub status: &'static str,
    pub downloads: Vec<JobHandle>,
}

#[derive(Debug, Serialize)]
pub struct SubmitErrorResponse {
    pub status: &'static str,
    pub message: String,
}

fn submit_error(e: DownloadError) -> (StatusCode, Json<SubmitErrorResponse>) {
    let status = match e {
        DownloadError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(SubmitErrorResponse {
            status: "error",
            message: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/downloads
///
/// Body is a JSON array of download jobs. The whole batch is validated
/// before the first submission; an unparseable body is a validation error.
pub async fn submit_downloads(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Vec<DownloadJob>>, JsonRejection>,
) -> Result<Json<SubmitResponse>, (StatusCode, Json<SubmitErrorResponse>)> {
    let Json(jobs) = body.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejecting malformed download batch");
        submit_error(DownloadError::Validation(rejection.body_text()))
    })?;

    if jobs.is_empty() {
        return Err(submit_error(DownloadError::Validation(
            "no download jobs given".to_string(),
        )));
    }

    match state.dispatcher().submit_batch(&jobs).await {
        Ok(downloads) => {
            info!(count = downloads.len(), "Download batch submitted");
            Ok(Json(SubmitResponse {
                status: "ok",
                downloads,
            }))
        }
        Err(e) => {
            warn!(error = %e, "Download batch failed");
            Err(submit_error(e))
        }
    }
}

/// GET /api/v1/downloads/{gid}
pub async fn get_download(
    State(state): State<Arc<AppState>>,
    Path(gid): Path<String>,
) -> Result<Json<DownloadStatus>, (StatusCode, Json<ErrorResponse>)> {
    state.dispatcher().status(&gid).await.map(Json).map_err(|e| {
        let status = match e {
            DownloadError::UnknownGid(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_GATEWAY,
        };
        error_response(status, e)
    })
}
