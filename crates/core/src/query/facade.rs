use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::catalog::{CatalogSource, MediaKind, Season, SeriesInfo, VodInfo};
use crate::search_index::{SearchIndex, SearchRequest};

use super::{Page, QueryError};

/// VOD and series hits for one query.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CombinedResults {
    pub vods: Vec<Value>,
    pub series: Vec<Value>,
}

/// Query façade.
pub struct MediaQuery {
    source: Arc<dyn CatalogSource>,
    index: Arc<dyn SearchIndex>,
}

impl MediaQuery {
    pub fn new(source: Arc<dyn CatalogSource>, index: Arc<dyn SearchIndex>) -> Self {
        Self { source, index }
    }

    /// Search the movies collection. Hits keep the index's relevance order.
    pub async fn search_vods(
        &self,
        query: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Value>, QueryError> {
        self.search(MediaKind::Vod, query, Page::new(page, limit)?)
            .await
    }

    /// Search the series collection.
    pub async fn search_series(
        &self,
        query: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Value>, QueryError> {
        self.search(MediaKind::Series, query, Page::new(page, limit)?)
            .await
    }

    /// Search both collections with the same paging.
    pub async fn search_all(
        &self,
        query: &str,
        page: u32,
        limit: u32,
    ) -> Result<CombinedResults, QueryError> {
        let page = Page::new(page, limit)?;
        let (vods, series) = futures::future::try_join(
            self.search(MediaKind::Vod, query, page),
            self.search(MediaKind::Series, query, page),
        )
        .await?;
        Ok(CombinedResults { vods, series })
    }

    /// Browse the movies collection in stored order.
    pub async fn list_vods(&self, page: u32, limit: u32) -> Result<Vec<Value>, QueryError> {
        self.browse(MediaKind::Vod, Page::new(page, limit)?).await
    }

    /// Browse the series collection in stored order.
    pub async fn list_series(&self, page: u32, limit: u32) -> Result<Vec<Value>, QueryError> {
        self.browse(MediaKind::Series, Page::new(page, limit)?)
            .await
    }

    /// Live series details, with seasons synthesized when the provider
    /// sends none.
    pub async fn series_info(&self, series_id: u64) -> Result<SeriesInfo, QueryError> {
        let info = self.source.series_info(series_id).await?;
        Ok(normalize_series_info(info))
    }

    /// Live VOD details.
    pub async fn vod_info(&self, vod_id: u64) -> Result<VodInfo, QueryError> {
        Ok(self.source.vod_info(vod_id).await?)
    }

    async fn search(
        &self,
        kind: MediaKind,
        query: &str,
        page: Page,
    ) -> Result<Vec<Value>, QueryError> {
        let request = SearchRequest {
            query: query.to_string(),
            limit: page.limit,
            offset: page.offset(),
        };
        let result = self.index.search(kind.index_uid(), &request).await?;
        debug!(
            collection = kind.index_uid(),
            hits = result.hits.len(),
            "Search complete"
        );
        Ok(result.hits)
    }

    async fn browse(&self, kind: MediaKind, page: Page) -> Result<Vec<Value>, QueryError> {
        let result = self
            .index
            .documents(kind.index_uid(), page.limit, page.offset())
            .await?;
        Ok(result.results)
    }
}

/// Fill in season records from the episode mapping when none were sent.
///
/// Season `n` (for `n` in `1..=episodes.len()`) counts the episodes keyed `n`.
/// Episode timestamps also get their display form here.
pub fn normalize_series_info(mut info: SeriesInfo) -> SeriesInfo {
    for episode in info.episodes.values_mut().flatten() {
        episode.added_display = episode.added_display();
    }
    if info.seasons.is_empty() && !info.episodes.is_empty() {
        info.seasons = (1..=info.episodes.len() as u32)
            .map(|n| {
                let count = info.episodes.get(&n).map(|e| e.len()).unwrap_or(0);
                Season::synthesized(n, count as u32)
            })
            .collect();
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;
    use crate::search_index::IndexError;
    use crate::testing::{fixtures, MockCatalogSource, MockSearchIndex};

    fn series_info(json: &str) -> SeriesInfo {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_normalize_synthesizes_seasons() {
        let info = series_info(
            r#"{
                "info": {"name": "Show"},
                "seasons": [],
                "episodes": {
                    "1": [{"id": 1, "title": "e1"}, {"id": 2, "title": "e2"}],
                    "2": [{"id": 3, "title": "e3"}]
                }
            }"#,
        );

        let normalized = normalize_series_info(info);
        assert_eq!(
            normalized.seasons,
            vec![Season::synthesized(1, 2), Season::synthesized(2, 1)]
        );
        assert_eq!(normalized.seasons[0].name, "Season 1");
    }

    #[test]
    fn test_normalize_keeps_provider_seasons() {
        let info = series_info(
            r#"{
                "info": {"name": "Show"},
                "seasons": [{"name": "Pilot Season", "episode_count": 1, "season_number": 1}],
                "episodes": {"1": [{"id": 1, "title": "e1"}]}
            }"#,
        );

        let normalized = normalize_series_info(info);
        assert_eq!(normalized.seasons.len(), 1);
        assert_eq!(normalized.seasons[0].name, "Pilot Season");
    }

    #[test]
    fn test_normalize_without_episodes() {
        let info = series_info(r#"{"info": {"name": "Show"}, "seasons": [], "episodes": []}"#);
        assert!(normalize_series_info(info).seasons.is_empty());
    }

    #[test]
    fn test_normalize_formats_episode_timestamps() {
        let info = series_info(
            r#"{
                "info": {"name": "Show"},
                "episodes": {"1": [
                    {"id": 1, "title": "e1", "added": "1700000000"},
                    {"id": 2, "title": "e2", "added": "not a number"}
                ]}
            }"#,
        );

        let normalized = normalize_series_info(info);
        let episodes = &normalized.episodes[&1];
        assert_eq!(
            episodes[0].added_display.as_deref(),
            Some("2023-11-14 22:13:20")
        );
        assert_eq!(episodes[0].added.as_deref(), Some("1700000000"));
        assert_eq!(episodes[1].added_display, None);
    }

    #[tokio::test]
    async fn test_search_empty_index_returns_empty() {
        let index = Arc::new(MockSearchIndex::new());
        index.create("movies", "stream_id").await;
        let query = MediaQuery::new(Arc::new(MockCatalogSource::new()), index);

        let hits = query.search_vods("", 1, 10).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_pages_map_to_offsets() {
        let index = Arc::new(MockSearchIndex::new());
        let docs: Vec<_> = (1..=25)
            .map(|i| fixtures::vod_document(i, &format!("Movie {}", i)))
            .collect();
        index.seed("movies", "stream_id", docs).await;
        let query = MediaQuery::new(Arc::new(MockCatalogSource::new()), index.clone());

        let hits = query.search_vods("movie", 2, 10).await.unwrap();
        assert_eq!(hits.len(), 10);
        assert_eq!(hits[0]["stream_id"], 11);

        let last = index.last_search().await.unwrap();
        assert_eq!(last.1.offset, 10);
        assert_eq!(last.1.limit, 10);
    }

    #[tokio::test]
    async fn test_invalid_page_rejected() {
        let query = MediaQuery::new(
            Arc::new(MockCatalogSource::new()),
            Arc::new(MockSearchIndex::new()),
        );
        assert!(matches!(
            query.search_series("x", 0, 10).await,
            Err(QueryError::InvalidPagination(_))
        ));
        assert!(matches!(
            query.list_vods(1, 0).await,
            Err(QueryError::InvalidPagination(_))
        ));
    }

    #[tokio::test]
    async fn test_list_series_offsets() {
        let index = Arc::new(MockSearchIndex::new());
        let docs: Vec<_> = (1..=15)
            .map(|i| fixtures::series_document(i, &format!("Show {}", i)))
            .collect();
        index.seed("series", "series_id", docs).await;
        let query = MediaQuery::new(Arc::new(MockCatalogSource::new()), index);

        let page = query.list_series(2, 10).await.unwrap();
        assert_eq!(page.len(), 5);
        assert_eq!(page[0]["series_id"], 11);
    }

    #[tokio::test]
    async fn test_search_all_combines_collections() {
        let index = Arc::new(MockSearchIndex::new());
        index
            .seed("movies", "stream_id", vec![fixtures::vod_document(1, "Star Trek")])
            .await;
        index
            .seed("series", "series_id", vec![fixtures::series_document(2, "Star Trek: TNG")])
            .await;
        let query = MediaQuery::new(Arc::new(MockCatalogSource::new()), index);

        let results = query.search_all("star", 1, 10).await.unwrap();
        assert_eq!(results.vods.len(), 1);
        assert_eq!(results.series.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_collection_is_index_error() {
        let query = MediaQuery::new(
            Arc::new(MockCatalogSource::new()),
            Arc::new(MockSearchIndex::new()),
        );
        let result = query.search_vods("x", 1, 10).await;
        assert!(matches!(result, Err(QueryError::Index(IndexError::Api { .. }))));
    }

    #[tokio::test]
    async fn test_series_info_not_found() {
        let query = MediaQuery::new(
            Arc::new(MockCatalogSource::new()),
            Arc::new(MockSearchIndex::new()),
        );
        assert!(matches!(
            query.series_info(404).await,
            Err(QueryError::NotFound(_))
        ));
        assert!(matches!(query.vod_info(404).await, Err(QueryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_series_info_is_normalized_and_live() {
        let source = MockCatalogSource::new().with_series_info(7, fixtures::series_info_without_seasons("Show", &[3, 2]));
        let query = MediaQuery::new(Arc::new(source), Arc::new(MockSearchIndex::new()));

        let info = query.series_info(7).await.unwrap();
        assert_eq!(info.seasons.len(), 2);
        assert_eq!(info.seasons[0].episode_count, 3);
        assert_eq!(info.seasons[1].episode_count, 2);
    }

    #[tokio::test]
    async fn test_catalog_failure_surfaces() {
        let source = MockCatalogSource::new().with_detail_error(CatalogError::Timeout);
        let query = MediaQuery::new(Arc::new(source), Arc::new(MockSearchIndex::new()));
        assert!(matches!(
            query.vod_info(1).await,
            Err(QueryError::Catalog(CatalogError::Timeout))
        ));
    }
}
