//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the middleman server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Stored transcript count (collected dynamically)
//! - Ticket lifecycle, transcript and calc metrics from the core crate

use std::path::Path;

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

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
            "middleman_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("middleman_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "middleman_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Transcript Storage (collected dynamically)
// =============================================================================

/// Transcript documents currently stored.
pub static TRANSCRIPTS_STORED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "middleman_transcripts_stored",
        "Number of transcript documents in the transcripts directory",
    )
    .unwrap()
});

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

    // Storage
    registry
        .register(Box::new(TRANSCRIPTS_STORED.clone()))
        .unwrap();

    // Core metrics (lifecycle, transcripts, calc)
    for metric in middleman_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Refresh gauges that mirror the filesystem.
pub async fn collect_dynamic_metrics(transcripts_dir: &Path) {
    let Ok(mut entries) = tokio::fs::read_dir(transcripts_dir).await else {
        TRANSCRIPTS_STORED.set(0);
        return;
    };
    let mut count = 0i64;
    while let Ok(Some(entry)) = entries.next_entry().await {
        if entry.path().extension().is_some_and(|ext| ext == "html") {
            count += 1;
        }
    }
    TRANSCRIPTS_STORED.set(count);
}

static TRANSCRIPT_PATH: Lazy<regex_lite::Regex> =
    Lazy::new(|| regex_lite::Regex::new(r"^/transcripts/[^/]+$").unwrap());

/// Normalize a path for metric labels (one label for every stored document).
pub fn normalize_path(path: &str) -> String {
    TRANSCRIPT_PATH
        .replace(path, "/transcripts/{filename}")
        .to_string()
}
