//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Index synchronization (runs, duration, documents)
//! - Remote catalog requests
//! - Download dispatch

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts};

// =============================================================================
// Sync Metrics
// =============================================================================

/// Sync runs total by result.
pub static SYNC_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("lionz_sync_runs_total", "Total index sync runs"),
        &["result"], // "complete", "partial", "rejected"
    )
    .unwrap()
});

/// Sync duration in seconds.
pub static SYNC_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("lionz_sync_duration_seconds", "Duration of a full index sync")
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1200.0]),
        &["result"],
    )
    .unwrap()
});

/// Documents written by the last sync, per collection.
pub static DOCUMENTS_INDEXED: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "lionz_documents_indexed",
            "Documents written to each collection by the last sync",
        ),
        &["collection"],
    )
    .unwrap()
});

/// Collections that failed during a sync, per stage.
pub static SYNC_STREAM_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "lionz_sync_stream_failures_total",
            "Collection sync failures by stage",
        ),
        &["collection", "stage"],
    )
    .unwrap()
});

// =============================================================================
// Remote Catalog Metrics
// =============================================================================

/// Failed catalog source requests by action.
pub static REMOTE_FETCH_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "lionz_remote_fetch_failures_total",
            "Failed catalog source requests",
        ),
        &["action"],
    )
    .unwrap()
});

// =============================================================================
// Download Metrics
// =============================================================================

/// Downloads submitted to the downloader, by kind.
pub static DOWNLOADS_SUBMITTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("lionz_downloads_submitted_total", "Downloads submitted"),
        &["kind"], // "vod", "series"
    )
    .unwrap()
});

/// Download submissions that failed, by reason.
pub static DOWNLOAD_SUBMISSION_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "lionz_download_submission_failures_total",
            "Failed download submissions",
        ),
        &["reason"], // "validation", "rpc", "connection", "timeout", "invalid_response"
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Sync
        Box::new(SYNC_RUNS.clone()),
        Box::new(SYNC_DURATION.clone()),
        Box::new(DOCUMENTS_INDEXED.clone()),
        Box::new(SYNC_STREAM_FAILURES.clone()),
        // Remote
        Box::new(REMOTE_FETCH_FAILURES.clone()),
        // Downloads
        Box::new(DOWNLOADS_SUBMITTED.clone()),
        Box::new(DOWNLOAD_SUBMISSION_FAILURES.clone()),
    ]
}
