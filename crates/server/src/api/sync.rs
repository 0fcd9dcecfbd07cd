//! Index sync API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use lionz_core::{SyncError, SyncReport, SyncStatus};
use tracing::{error, info};

use super::handlers::error_response;
use crate::state::AppState;

/// POST /api/v1/index/sync
///
/// Rebuild both collections and return the report. The sync runs on its
/// own task so a dropped connection does not abort it halfway.
pub async fn start_sync(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SyncReport>, impl IntoResponse> {
    let sync = Arc::clone(state.sync());
    let result = tokio::spawn(async move { sync.sync().await }).await;

    match result {
        Ok(Ok(report)) => {
            info!(complete = report.complete, "Index sync finished");
            Ok(Json(report))
        }
        Ok(Err(e @ SyncError::AlreadyRunning)) => Err(error_response(StatusCode::CONFLICT, e)),
        Ok(Err(e @ SyncError::StoreUnavailable(_))) => {
            Err(error_response(StatusCode::SERVICE_UNAVAILABLE, e))
        }
        Err(e) => {
            error!(error = %e, "Sync task panicked");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "sync task failed",
            ))
        }
    }
}

/// GET /api/v1/index/sync
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<SyncStatus> {
    Json(state.sync().status().await)
}
