use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{downloads, favorites, handlers, media, middleware::metrics_middleware, sync};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Index sync
        .route("/index/sync", post(sync::start_sync).get(sync::get_status))
        // Search (index)
        .route("/search", get(media::search_all))
        .route("/vods/search", get(media::search_vods))
        .route("/series/search", get(media::search_series))
        // Browse (index)
        .route("/vods", get(media::list_vods))
        .route("/series", get(media::list_series))
        // Details (live catalog)
        .route("/vods/{id}", get(media::get_vod))
        .route("/series/{id}", get(media::get_series))
        // Downloads
        .route("/downloads", post(downloads::submit_downloads))
        .route("/downloads/{gid}", get(downloads::get_download))
        // Favorites
        .route("/favorites", get(favorites::list_favorites))
        .route("/favorites/toggle", post(favorites::toggle_favorite))
        .route(
            "/favorites/{kind}/{stream_id}",
            get(favorites::get_favorite).delete(favorites::remove_favorite),
        )
        .with_state(state.clone());

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics).with_state(state))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
