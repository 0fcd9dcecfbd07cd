use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::search_index::IndexError;

/// Whole-sync failures. Everything else is recorded in the [`SyncReport`].
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("A sync is already running")]
    AlreadyRunning,

    #[error("Search index unavailable: {0}")]
    StoreUnavailable(IndexError),
}

/// Step at which a collection sync failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    /// Deleting or recreating the collection.
    Reset,
    /// Fetching the listing from the catalog source.
    Fetch,
    /// Bulk insert and its task.
    Index,
}

impl SyncStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStage::Reset => "reset",
            SyncStage::Fetch => "fetch",
            SyncStage::Index => "index",
        }
    }
}

/// Result of syncing one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StreamOutcome {
    Indexed { documents: usize },
    Failed { stage: SyncStage, error: String },
}

impl StreamOutcome {
    pub fn is_indexed(&self) -> bool {
        matches!(self, StreamOutcome::Indexed { .. })
    }
}

/// Summary of a sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub series: StreamOutcome,
    pub movies: StreamOutcome,
    /// Both collections were rebuilt without error.
    pub complete: bool,
}

/// Current sync state, as exposed over the API.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub running: bool,
    pub last_report: Option<SyncReport>,
}
