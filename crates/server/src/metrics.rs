//! Prometheus metrics for the HTTP surface.
//!
//! HTTP request metrics are recorded by middleware; a few gauges are
//! refreshed from application state on every scrape. Core metrics (sync,
//! remote fetches, downloads) are registered alongside.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use tracing::warn;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "lionz_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("lionz_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "lionz_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// State gauges (collected dynamically)
// =============================================================================

/// Sync running state (1 = running, 0 = idle).
pub static SYNC_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "lionz_sync_running",
        "Whether a catalog sync is running (1) or idle (0)",
    )
    .unwrap()
});

/// Stored favorites.
pub static FAVORITES_TOTAL: Lazy<IntGauge> =
    Lazy::new(|| IntGauge::new("lionz_favorites", "Number of stored favorites").unwrap());

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // State
    registry.register(Box::new(SYNC_RUNNING.clone())).unwrap();
    registry
        .register(Box::new(FAVORITES_TOTAL.clone()))
        .unwrap();

    // Core metrics (sync, remote fetches, downloads)
    for metric in lionz_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Refresh state gauges before a scrape.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    SYNC_RUNNING.set(if state.sync().is_running() { 1 } else { 0 });

    match state.favorites().list() {
        Ok(favorites) => FAVORITES_TOTAL.set(favorites.len() as i64),
        Err(e) => warn!(error = %e, "Failed to count favorites for metrics"),
    }
}

static GID_REGEX: Lazy<regex_lite::Regex> =
    Lazy::new(|| regex_lite::Regex::new(r"/downloads/[0-9a-fA-F]{16}(/|$)").unwrap());
static NUMERIC_REGEX: Lazy<regex_lite::Regex> =
    Lazy::new(|| regex_lite::Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = GID_REGEX.replace_all(path, "/downloads/{gid}$1");
    let result = NUMERIC_REGEX.replace_all(&result, "/{id}$1");
    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_numeric() {
        assert_eq!(normalize_path("/api/v1/vods/12345"), "/api/v1/vods/{id}");
    }

    #[test]
    fn test_normalize_path_favorite() {
        assert_eq!(
            normalize_path("/api/v1/favorites/series/42"),
            "/api/v1/favorites/series/{id}"
        );
    }

    #[test]
    fn test_normalize_path_gid() {
        assert_eq!(
            normalize_path("/api/v1/downloads/2089b05ecca3d829"),
            "/api/v1/downloads/{gid}"
        );
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/api/v1/health"), "/api/v1/health");
        assert_eq!(normalize_path("/api/v1/vods/search"), "/api/v1/vods/search");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("lionz_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_core_metrics() {
        SYNC_RUNNING.set(0);
        lionz_core::metrics::SYNC_RUNS
            .with_label_values(&["complete"])
            .inc_by(0);
        lionz_core::metrics::DOWNLOADS_SUBMITTED
            .with_label_values(&["vod"])
            .inc_by(0);

        let output = encode_metrics();
        assert!(output.contains("lionz_sync_running"));
        assert!(output.contains("lionz_sync_runs_total"));
        assert!(output.contains("lionz_downloads_submitted_total"));
    }
}
