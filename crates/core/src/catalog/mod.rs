//! Remote catalog source (Xtream Codes player API).
//!
//! This module provides a `CatalogSource` trait over the provider's listing and
//! detail endpoints, the typed response schemas, and the `XtreamClient`
//! implementation.

mod de;
mod types;
mod xtream;

pub use types::*;
pub use xtream::{build_stream_uri, XtreamAction, XtreamClient};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the catalog source.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// Credentials rejected or the provider is unreachable during session start.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timeout")]
    Timeout,

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Response did not match the expected schema.
    #[error("Failed to parse {action} response: {message}")]
    Parse { action: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Trait for remote catalog backends.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Fetch the complete series listing.
    async fn series(&self) -> Result<Vec<SeriesListing>, CatalogError>;

    /// Fetch the complete VOD listing.
    async fn vod_streams(&self) -> Result<Vec<VodStream>, CatalogError>;

    /// Fetch live series details (seasons and episodes).
    async fn series_info(&self, series_id: u64) -> Result<SeriesInfo, CatalogError>;

    /// Fetch live VOD details.
    async fn vod_info(&self, vod_id: u64) -> Result<VodInfo, CatalogError>;

    /// Build the direct stream URI for a VOD or an episode.
    ///
    /// The URI embeds the account credentials and must not be logged.
    fn stream_uri(&self, kind: MediaKind, id: u64, container_extension: &str) -> String;
}

/// Fetch one listing as catalog items, whichever kind is requested.
pub async fn fetch_listing(
    source: &dyn CatalogSource,
    kind: MediaKind,
) -> Result<Vec<CatalogItem>, CatalogError> {
    Ok(match kind {
        MediaKind::Vod => source
            .vod_streams()
            .await?
            .into_iter()
            .map(CatalogItem::Vod)
            .collect(),
        MediaKind::Series => source
            .series()
            .await?
            .into_iter()
            .map(CatalogItem::Series)
            .collect(),
    })
}
