use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::catalog::{fetch_listing, CatalogSource, MediaKind};
use crate::config::SyncConfig;
use crate::metrics;
use crate::search_index::{reset_index, SearchIndex};

use super::types::{StreamOutcome, SyncError, SyncReport, SyncStage, SyncStatus};

/// Clears the running flag when a sync ends, however it ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Full-replace sync from the catalog source into the search index.
pub struct CatalogSync {
    source: Arc<dyn CatalogSource>,
    index: Arc<dyn SearchIndex>,
    config: SyncConfig,
    running: AtomicBool,
    last_report: RwLock<Option<SyncReport>>,
}

impl CatalogSync {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        index: Arc<dyn SearchIndex>,
        config: SyncConfig,
    ) -> Self {
        Self {
            source,
            index,
            config,
            running: AtomicBool::new(false),
            last_report: RwLock::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub async fn status(&self) -> SyncStatus {
        SyncStatus {
            running: self.is_running(),
            last_report: self.last_report.read().await.clone(),
        }
    }

    /// Rebuild both collections.
    ///
    /// Only a concurrent run or an unhealthy store abort the whole sync;
    /// per-collection failures are logged and reported.
    pub async fn sync(&self) -> Result<SyncReport, SyncError> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Sync requested while another sync is running");
            metrics::SYNC_RUNS.with_label_values(&["rejected"]).inc();
            return Err(SyncError::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.running);

        if let Err(e) = self.index.health().await {
            error!(error = %e, "Search index health check failed, sync aborted");
            metrics::SYNC_RUNS.with_label_values(&["rejected"]).inc();
            return Err(SyncError::StoreUnavailable(e));
        }

        let started_at = Utc::now();
        let timer = Instant::now();
        info!(
            source = self.source.name(),
            parallel = self.config.parallel,
            "Starting catalog sync"
        );

        // Both collections are reset before any stream runs so that each
        // exists afterwards even when its stream fails.
        let series_reset = self.reset(MediaKind::Series).await;
        let movies_reset = self.reset(MediaKind::Vod).await;

        let (series, movies) = if self.config.parallel {
            futures::future::join(
                self.stream(MediaKind::Series, series_reset),
                self.stream(MediaKind::Vod, movies_reset),
            )
            .await
        } else {
            let series = self.stream(MediaKind::Series, series_reset).await;
            let movies = self.stream(MediaKind::Vod, movies_reset).await;
            (series, movies)
        };

        let complete = series.is_indexed() && movies.is_indexed();
        let result = if complete { "complete" } else { "partial" };
        let elapsed = timer.elapsed();

        metrics::SYNC_RUNS.with_label_values(&[result]).inc();
        metrics::SYNC_DURATION
            .with_label_values(&[result])
            .observe(elapsed.as_secs_f64());

        let report = SyncReport {
            started_at,
            duration_ms: elapsed.as_millis() as u64,
            series,
            movies,
            complete,
        };

        if complete {
            info!(duration_ms = report.duration_ms, "Catalog sync complete");
        } else {
            warn!(
                duration_ms = report.duration_ms,
                series = ?report.series,
                movies = ?report.movies,
                "Catalog sync finished with failures"
            );
        }

        *self.last_report.write().await = Some(report.clone());
        Ok(report)
    }

    async fn reset(&self, kind: MediaKind) -> Result<(), String> {
        let uid = kind.index_uid();
        match reset_index(self.index.as_ref(), uid, kind.primary_key()).await {
            Ok(()) => {
                info!(collection = uid, "Collection reset");
                Ok(())
            }
            Err(e) => {
                error!(collection = uid, error = %e, "Failed to reset collection");
                Err(e.to_string())
            }
        }
    }

    async fn stream(&self, kind: MediaKind, reset: Result<(), String>) -> StreamOutcome {
        let uid = kind.index_uid();
        let outcome = match reset {
            Ok(()) => self.fetch_and_index(kind).await,
            Err(error) => StreamOutcome::Failed {
                stage: SyncStage::Reset,
                error,
            },
        };

        match &outcome {
            StreamOutcome::Indexed { documents } => {
                metrics::DOCUMENTS_INDEXED
                    .with_label_values(&[uid])
                    .set(*documents as i64);
            }
            StreamOutcome::Failed { stage, .. } => {
                metrics::DOCUMENTS_INDEXED.with_label_values(&[uid]).set(0);
                metrics::SYNC_STREAM_FAILURES
                    .with_label_values(&[uid, stage.as_str()])
                    .inc();
            }
        }
        outcome
    }

    async fn fetch_and_index(&self, kind: MediaKind) -> StreamOutcome {
        let uid = kind.index_uid();

        let items = match fetch_listing(self.source.as_ref(), kind).await {
            Ok(items) => items,
            Err(e) => {
                error!(collection = uid, error = %e, "Failed to fetch listing, skipping");
                return StreamOutcome::Failed {
                    stage: SyncStage::Fetch,
                    error: e.to_string(),
                };
            }
        };
        info!(collection = uid, count = items.len(), "Fetched listing");

        let documents = match items
            .iter()
            .map(|item| item.to_document())
            .collect::<Result<Vec<Value>, _>>()
        {
            Ok(documents) => documents,
            Err(e) => {
                error!(collection = uid, error = %e, "Failed to encode documents");
                return StreamOutcome::Failed {
                    stage: SyncStage::Index,
                    error: e.to_string(),
                };
            }
        };
        let count = documents.len();

        let inserted = async {
            let task = self
                .index
                .add_documents(uid, kind.primary_key(), documents)
                .await?;
            self.index.wait_for_task(task).await?.into_result()
        }
        .await;

        match inserted {
            Ok(_) => {
                info!(collection = uid, documents = count, "Collection indexed");
                StreamOutcome::Indexed { documents: count }
            }
            Err(e) => {
                error!(collection = uid, error = %e, "Failed to index documents");
                StreamOutcome::Failed {
                    stage: SyncStage::Index,
                    error: e.to_string(),
                }
            }
        }
    }
}
