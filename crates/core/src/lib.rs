pub mod catalog;
pub mod config;
pub mod download;
pub mod favorites;
pub mod metrics;
pub mod query;
pub mod search_index;
pub mod sync;
pub mod testing;

pub use catalog::{
    CatalogError, CatalogItem, CatalogSource, Episode, MediaKind, Season, SeriesInfo,
    SeriesListing, VodInfo, VodStream, XtreamClient,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use download::{
    Aria2Client, DownloadDispatcher, DownloadError, DownloadJob, DownloadStatus, Downloader,
    JobHandle,
};
pub use favorites::{
    FavoriteError, FavoriteItem, FavoriteStore, NewFavorite, SqliteFavoriteStore, ToggleOutcome,
};
pub use query::{CombinedResults, MediaQuery, QueryError};
pub use search_index::{IndexError, MeilisearchClient, SearchIndex};
pub use sync::{CatalogSync, StreamOutcome, SyncError, SyncReport, SyncStatus};
