//! Testing utilities and mock implementations.
//!
//! This module provides in-memory implementations of every external service
//! trait, so sync, query and dispatch can be exercised without a catalog
//! provider, a search store or a download manager.
//!
//! # Example
//!
//! ```rust,ignore
//! use lionz_core::testing::{fixtures, MockCatalogSource, MockDownloader, MockSearchIndex};
//!
//! let source = MockCatalogSource::new().with_vods(vec![fixtures::vod(1, "Dune")]);
//! let index = MockSearchIndex::new();
//! let downloader = MockDownloader::new();
//!
//! // Use in AppState...
//! ```

mod mock_catalog;
mod mock_downloader;
mod mock_search_index;

pub use mock_catalog::{MockCatalogSource, MOCK_BASE_URL};
pub use mock_downloader::{MockDownloader, RecordedDownload, MOCK_DOWNLOAD_DIR};
pub use mock_search_index::MockSearchIndex;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::collections::BTreeMap;

    use serde_json::{json, Map, Value};

    use crate::catalog::{
        CatalogItem, Episode, SeriesDetails, SeriesInfo, SeriesListing, VodDetails, VodInfo,
        VodStream,
    };

    /// Create a VOD listing entry with reasonable defaults.
    pub fn vod(stream_id: u64, name: &str) -> VodStream {
        VodStream {
            stream_id,
            name: name.to_string(),
            container_extension: "mkv".to_string(),
            stream_icon: Some(format!("http://img.example/{}.jpg", stream_id)),
            category_id: Some("1".to_string()),
            added: Some("1700000000".to_string()),
            rating: Some("7.5".to_string()),
            extra: Map::new(),
        }
    }

    /// Create a series listing entry.
    pub fn series(series_id: u64, name: &str) -> SeriesListing {
        SeriesListing {
            series_id,
            name: name.to_string(),
            cover: Some(format!("http://img.example/s{}.jpg", series_id)),
            plot: Some(format!("A show called {}.", name)),
            genre: Some("Drama".to_string()),
            rating: Some("8".to_string()),
            last_modified: Some("1700000000".to_string()),
            category_id: Some("2".to_string()),
            extra: Map::new(),
        }
    }

    /// A VOD as stored in the movies collection.
    pub fn vod_document(stream_id: u64, name: &str) -> Value {
        CatalogItem::Vod(vod(stream_id, name))
            .to_document()
            .unwrap_or_else(|_| json!({ "stream_id": stream_id, "name": name }))
    }

    /// A series as stored in the series collection.
    pub fn series_document(series_id: u64, name: &str) -> Value {
        CatalogItem::Series(series(series_id, name))
            .to_document()
            .unwrap_or_else(|_| json!({ "series_id": series_id, "name": name }))
    }

    /// Create an episode.
    pub fn episode(id: u64, season: u32, episode_num: u32) -> Episode {
        Episode {
            id,
            episode_num,
            title: format!("S{:02}E{:02}", season, episode_num),
            container_extension: "mkv".to_string(),
            season,
            added: Some("1700000000".to_string()),
            added_display: None,
            info: Map::new(),
        }
    }

    /// Series details with no season records; `episodes_per_season[i]` is
    /// the episode count of season `i + 1`.
    pub fn series_info_without_seasons(name: &str, episodes_per_season: &[u32]) -> SeriesInfo {
        let mut next_id = 1000;
        let mut episodes = BTreeMap::new();
        for (idx, count) in episodes_per_season.iter().enumerate() {
            let season = idx as u32 + 1;
            let list = (1..=*count)
                .map(|n| {
                    next_id += 1;
                    episode(next_id, season, n)
                })
                .collect();
            episodes.insert(season, list);
        }

        SeriesInfo {
            info: SeriesDetails {
                name: name.to_string(),
                ..Default::default()
            },
            seasons: Vec::new(),
            episodes,
        }
    }

    /// VOD details.
    pub fn vod_info(stream_id: u64, name: &str) -> VodInfo {
        VodInfo {
            info: VodDetails {
                plot: Some(format!("A movie called {}.", name)),
                duration: Some("02:35:00".to_string()),
                ..Default::default()
            },
            movie_data: vod(stream_id, name),
        }
    }
}
