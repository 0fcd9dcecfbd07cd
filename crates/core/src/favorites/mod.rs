//! Favorite items, persisted locally.
//!
//! A favorite is unique per `(kind, stream_id)` and is toggled by user
//! action: created when absent, deleted when present.

mod sqlite_store;

pub use sqlite_store::SqliteFavoriteStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::MediaKind;

/// Errors from favorite storage.
#[derive(Debug, Error)]
pub enum FavoriteError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Favorite not found: {kind} {stream_id}")]
    NotFound { kind: String, stream_id: u64 },
}

/// A stored favorite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteItem {
    pub kind: MediaKind,
    /// `stream_id` for VOD, `series_id` for series.
    pub stream_id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub added: DateTime<Utc>,
}

/// Request to toggle a favorite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFavorite {
    pub kind: MediaKind,
    pub stream_id: u64,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// What a toggle did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added { favorite: FavoriteItem },
    Removed,
}

/// Trait for favorite storage backends.
pub trait FavoriteStore: Send + Sync {
    /// Create the favorite if absent, delete it otherwise.
    fn toggle(&self, favorite: NewFavorite) -> Result<ToggleOutcome, FavoriteError>;

    /// All favorites, most recently added first.
    fn list(&self) -> Result<Vec<FavoriteItem>, FavoriteError>;

    fn is_favorite(&self, kind: MediaKind, stream_id: u64) -> Result<bool, FavoriteError>;

    /// Delete a favorite.
    fn remove(&self, kind: MediaKind, stream_id: u64) -> Result<(), FavoriteError>;
}
