//! Response schemas for the catalog source.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de;

/// Kind of catalog media.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Vod,
    Series,
}

impl MediaKind {
    /// Returns the string representation for API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Vod => "vod",
            MediaKind::Series => "series",
        }
    }

    /// Search index collection holding this kind.
    pub fn index_uid(&self) -> &'static str {
        match self {
            MediaKind::Vod => "movies",
            MediaKind::Series => "series",
        }
    }

    /// Primary key of this kind's documents.
    pub fn primary_key(&self) -> &'static str {
        match self {
            MediaKind::Vod => "stream_id",
            MediaKind::Series => "series_id",
        }
    }

    /// Path segment used by the provider's stream URIs.
    pub fn stream_path(&self) -> &'static str {
        match self {
            MediaKind::Vod => "movie",
            MediaKind::Series => "series",
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vod" => Ok(MediaKind::Vod),
            "series" => Ok(MediaKind::Series),
            other => Err(format!("unknown media kind: {}", other)),
        }
    }
}

/// One entry of the VOD listing (`get_vod_streams`), also the `movie_data`
/// block of `get_vod_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VodStream {
    #[serde(deserialize_with = "de::id")]
    pub stream_id: u64,
    #[serde(default, deserialize_with = "de::string")]
    pub name: String,
    #[serde(default, deserialize_with = "de::string")]
    pub container_extension: String,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub stream_icon: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub category_id: Option<String>,
    /// Epoch seconds, as sent by the provider.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub added: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub rating: Option<String>,
    /// Provider fields without a dedicated slot; kept so indexed documents
    /// mirror the remote listing.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the series listing (`get_series`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesListing {
    #[serde(deserialize_with = "de::id")]
    pub series_id: u64,
    #[serde(default, deserialize_with = "de::string")]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub plot: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub last_modified: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub category_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A catalog item of either kind, identified by its kind-specific id.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CatalogItem {
    Vod(VodStream),
    Series(SeriesListing),
}

impl CatalogItem {
    pub fn kind(&self) -> MediaKind {
        match self {
            CatalogItem::Vod(_) => MediaKind::Vod,
            CatalogItem::Series(_) => MediaKind::Series,
        }
    }

    /// `stream_id` for VOD, `series_id` for series.
    pub fn id(&self) -> u64 {
        match self {
            CatalogItem::Vod(v) => v.stream_id,
            CatalogItem::Series(s) => s.series_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CatalogItem::Vod(v) => &v.name,
            CatalogItem::Series(s) => &s.name,
        }
    }

    /// Poster/cover image, if the provider sent one.
    pub fn image(&self) -> Option<&str> {
        match self {
            CatalogItem::Vod(v) => v.stream_icon.as_deref(),
            CatalogItem::Series(s) => s.cover.as_deref(),
        }
    }

    /// JSON document as stored in the search index.
    pub fn to_document(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Details of a series (`get_series_info`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesInfo {
    #[serde(default, deserialize_with = "de::object_or_default")]
    pub info: SeriesDetails,
    #[serde(default)]
    pub seasons: Vec<Season>,
    /// Season number -> episodes, in season order.
    #[serde(default, deserialize_with = "de::episode_map")]
    pub episodes: BTreeMap<u32, Vec<Episode>>,
}

/// The `info` block of a series detail response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesDetails {
    #[serde(default, deserialize_with = "de::string")]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub plot: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub cast: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub director: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub genre: Option<String>,
    #[serde(default, rename = "releaseDate", deserialize_with = "de::opt_string")]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub rating: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A season record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    #[serde(default, deserialize_with = "de::string")]
    pub name: String,
    #[serde(default, deserialize_with = "de::count")]
    pub episode_count: u32,
    #[serde(default, deserialize_with = "de::count")]
    pub season_number: u32,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub air_date: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
}

impl Season {
    /// Season record derived from the episode mapping alone.
    pub fn synthesized(season_number: u32, episode_count: u32) -> Self {
        Self {
            name: format!("Season {}", season_number),
            episode_count,
            season_number,
            cover: None,
            air_date: None,
            overview: None,
        }
    }
}

/// An episode of a series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    #[serde(deserialize_with = "de::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub episode_num: u32,
    #[serde(default, deserialize_with = "de::string")]
    pub title: String,
    #[serde(default, deserialize_with = "de::string")]
    pub container_extension: String,
    #[serde(default, deserialize_with = "de::count")]
    pub season: u32,
    /// Epoch seconds, as sent by the provider.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub added: Option<String>,
    /// `added` formatted for display; filled in on the read path.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub added_display: Option<String>,
    #[serde(default, deserialize_with = "de::object_or_default")]
    pub info: Map<String, Value>,
}

impl Episode {
    /// Parse `added` as epoch seconds.
    pub fn added_at(&self) -> Option<DateTime<Utc>> {
        let secs: i64 = self.added.as_deref()?.trim().parse().ok()?;
        Utc.timestamp_opt(secs, 0).single()
    }

    /// `added` rendered for display (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub fn added_display(&self) -> Option<String> {
        self.added_at()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

/// Details of a VOD (`get_vod_info`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VodInfo {
    #[serde(default, deserialize_with = "de::object_or_default")]
    pub info: VodDetails,
    pub movie_data: VodStream,
}

/// The `info` block of a VOD detail response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VodDetails {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub movie_image: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub plot: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub cast: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub director: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub releasedate: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub tmdb_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
