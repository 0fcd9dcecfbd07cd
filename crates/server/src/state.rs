use std::sync::Arc;

use lionz_core::{
    CatalogSync, Config, DownloadDispatcher, FavoriteStore, MediaQuery, SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    sync: Arc<CatalogSync>,
    query: MediaQuery,
    dispatcher: DownloadDispatcher,
    favorites: Arc<dyn FavoriteStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        sync: Arc<CatalogSync>,
        query: MediaQuery,
        dispatcher: DownloadDispatcher,
        favorites: Arc<dyn FavoriteStore>,
    ) -> Self {
        Self {
            config,
            sync,
            query,
            dispatcher,
            favorites,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// Shared handle, so a sync can outlive the request that started it.
    pub fn sync(&self) -> &Arc<CatalogSync> {
        &self.sync
    }

    pub fn query(&self) -> &MediaQuery {
        &self.query
    }

    pub fn dispatcher(&self) -> &DownloadDispatcher {
        &self.dispatcher
    }

    pub fn favorites(&self) -> &dyn FavoriteStore {
        self.favorites.as_ref()
    }
}
