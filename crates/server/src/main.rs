use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lionz_core::{
    load_config, validate_config, Aria2Client, CatalogSource, CatalogSync, DownloadDispatcher,
    Downloader, FavoriteStore, MediaQuery, MeilisearchClient, SearchIndex, SqliteFavoriteStore,
    XtreamClient,
};
use lionz_server::api::create_router;
use lionz_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("LIONZ_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Invalid configuration")?;

    info!("lionz v{} starting", VERSION);
    info!(
        "Catalog source: {} (user {})",
        config.xtream.base_url(),
        config.xtream.username
    );
    info!("Search index: {}", config.search_index.url);
    info!("Downloader: {}", config.downloader.rpc_endpoint());

    // Search index must be reachable before anything else runs
    let index = MeilisearchClient::new(&config.search_index)
        .context("Failed to create search index client")?;
    index
        .health()
        .await
        .context("Search index health check failed")?;
    let index: Arc<dyn SearchIndex> = Arc::new(index);
    info!("Search index is healthy");

    // Authenticated catalog session, shared by sync, query and dispatch
    let source: Arc<dyn CatalogSource> = Arc::new(
        XtreamClient::connect(config.xtream.clone())
            .await
            .context("Failed to authenticate with the catalog source")?,
    );
    info!("Catalog source session established");

    let downloader: Arc<dyn Downloader> = Arc::new(
        Aria2Client::new(&config.downloader).context("Failed to create downloader client")?,
    );

    info!("Opening favorites database at {:?}", config.database.path);
    let favorites: Arc<dyn FavoriteStore> = Arc::new(
        SqliteFavoriteStore::new(&config.database.path)
            .context("Failed to open favorites database")?,
    );

    let sync = Arc::new(CatalogSync::new(
        Arc::clone(&source),
        Arc::clone(&index),
        config.sync.clone(),
    ));
    let query = MediaQuery::new(Arc::clone(&source), Arc::clone(&index));
    let dispatcher = DownloadDispatcher::new(Arc::clone(&source), downloader);

    if config.sync.on_startup {
        info!("Running startup index sync in the background");
        let sync = Arc::clone(&sync);
        tokio::spawn(async move {
            match sync.sync().await {
                Ok(report) if report.complete => info!("Startup sync complete"),
                Ok(_) => warn!("Startup sync finished with failures"),
                Err(e) => error!(error = %e, "Startup sync failed"),
            }
        });
    }

    // Create app state
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, sync, query, dispatcher, favorites));

    // Create router
    let app = create_router(state);

    // Start server
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
