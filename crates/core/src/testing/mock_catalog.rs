//! Mock catalog source for testing.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::catalog::{
    build_stream_uri, CatalogError, CatalogSource, MediaKind, SeriesInfo, SeriesListing, VodInfo,
    VodStream,
};

pub const MOCK_BASE_URL: &str = "http://mock.example:8080";

#[derive(Debug, Default)]
struct MockCatalogState {
    vods: Vec<VodStream>,
    series: Vec<SeriesListing>,
    vods_error: Option<CatalogError>,
    series_error: Option<CatalogError>,
    series_info: HashMap<u64, SeriesInfo>,
    vod_info: HashMap<u64, VodInfo>,
    detail_error: Option<CatalogError>,
    listing_calls: u32,
    listing_delay: Option<Duration>,
}

/// Mock implementation of the CatalogSource trait.
///
/// Serves configured listings and details; unknown detail ids are
/// `NotFound`. Stream URIs use `http://mock.example:8080` with the
/// credentials `user`/`pass`.
///
/// # Example
///
/// ```rust,ignore
/// let source = MockCatalogSource::new()
///     .with_vods(vec![fixtures::vod(1, "Dune")])
///     .with_series_error(CatalogError::Timeout);
/// ```
#[derive(Debug, Default)]
pub struct MockCatalogSource {
    state: RwLock<MockCatalogState>,
}

impl MockCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn state_mut(&mut self) -> &mut MockCatalogState {
        self.state.get_mut()
    }

    pub fn with_vods(mut self, vods: Vec<VodStream>) -> Self {
        self.state_mut().vods = vods;
        self
    }

    pub fn with_series(mut self, series: Vec<SeriesListing>) -> Self {
        self.state_mut().series = series;
        self
    }

    pub fn with_vods_error(mut self, error: CatalogError) -> Self {
        self.state_mut().vods_error = Some(error);
        self
    }

    pub fn with_series_error(mut self, error: CatalogError) -> Self {
        self.state_mut().series_error = Some(error);
        self
    }

    pub fn with_series_info(mut self, series_id: u64, info: SeriesInfo) -> Self {
        self.state_mut().series_info.insert(series_id, info);
        self
    }

    pub fn with_vod_info(mut self, vod_id: u64, info: VodInfo) -> Self {
        self.state_mut().vod_info.insert(vod_id, info);
        self
    }

    /// Make every detail lookup fail with this error.
    pub fn with_detail_error(mut self, error: CatalogError) -> Self {
        self.state_mut().detail_error = Some(error);
        self
    }

    /// Delay every listing response (to keep a sync in flight).
    pub fn with_listing_delay(mut self, delay: Duration) -> Self {
        self.state_mut().listing_delay = Some(delay);
        self
    }

    async fn listing_pause(&self) {
        let delay = {
            let mut state = self.state.write().await;
            state.listing_calls += 1;
            state.listing_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    /// Replace the VOD listing.
    pub async fn set_vods(&self, vods: Vec<VodStream>) {
        self.state.write().await.vods = vods;
    }

    /// Replace the series listing.
    pub async fn set_series(&self, series: Vec<SeriesListing>) {
        self.state.write().await.series = series;
    }

    /// Set or clear the series listing failure.
    pub async fn set_series_error(&self, error: Option<CatalogError>) {
        self.state.write().await.series_error = error;
    }

    /// Number of listing requests served so far.
    pub async fn listing_calls(&self) -> u32 {
        self.state.read().await.listing_calls
    }
}

#[async_trait]
impl CatalogSource for MockCatalogSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn series(&self) -> Result<Vec<SeriesListing>, CatalogError> {
        self.listing_pause().await;
        let state = self.state.read().await;
        match &state.series_error {
            Some(e) => Err(e.clone()),
            None => Ok(state.series.clone()),
        }
    }

    async fn vod_streams(&self) -> Result<Vec<VodStream>, CatalogError> {
        self.listing_pause().await;
        let state = self.state.read().await;
        match &state.vods_error {
            Some(e) => Err(e.clone()),
            None => Ok(state.vods.clone()),
        }
    }

    async fn series_info(&self, series_id: u64) -> Result<SeriesInfo, CatalogError> {
        let state = self.state.read().await;
        if let Some(e) = &state.detail_error {
            return Err(e.clone());
        }
        state
            .series_info
            .get(&series_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("Series {}", series_id)))
    }

    async fn vod_info(&self, vod_id: u64) -> Result<VodInfo, CatalogError> {
        let state = self.state.read().await;
        if let Some(e) = &state.detail_error {
            return Err(e.clone());
        }
        state
            .vod_info
            .get(&vod_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("VOD {}", vod_id)))
    }

    fn stream_uri(&self, kind: MediaKind, id: u64, container_extension: &str) -> String {
        build_stream_uri(MOCK_BASE_URL, "user", "pass", kind, id, container_extension)
    }
}
