//! Prometheus metrics for the job runner.
//!
//! This module provides metrics for:
//! - Scan/dispatch cycles and connection failures
//! - Claimed rows and finished jobs
//! - Worker pool occupancy
//!
//! There is no HTTP endpoint; when a textfile path is configured the runner
//! writes the exposition format there after every cycle, for the node
//! exporter's textfile collector.

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::path::Path;

/// Crate metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    for metric in all_metrics() {
        // Only fails on duplicate registration, which all_metrics() rules out
        let _ = registry.register(metric);
    }
    registry
});

// =============================================================================
// Dispatch Metrics
// =============================================================================

/// Scan/dispatch cycles by result.
pub static SCAN_CYCLES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("sheetcut_scan_cycles_total", "Total scan/dispatch cycles"),
        &["result"], // "ok", "connection_error"
    )
    .unwrap()
});

/// Rows claimed for processing.
pub static ROWS_CLAIMED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("sheetcut_rows_claimed_total", "Total rows claimed").unwrap()
});

/// Data source connection failures (open, read or write).
pub static CONNECTION_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "sheetcut_connection_failures_total",
        "Total data source connection failures",
    )
    .unwrap()
});

// =============================================================================
// Job Metrics
// =============================================================================

/// Jobs finished by result.
pub static JOBS_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("sheetcut_jobs_finished_total", "Total jobs finished"),
        &["result"], // "complete", "retrieval_error", "internal_error", "unrecorded"
    )
    .unwrap()
});

/// Job duration in seconds.
pub static JOB_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("sheetcut_job_duration_seconds", "Duration of row jobs").buckets(vec![
            1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0,
        ]),
    )
    .unwrap()
});

/// Jobs currently running.
pub static ACTIVE_JOBS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("sheetcut_active_jobs", "Number of jobs currently running").unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SCAN_CYCLES.clone()),
        Box::new(ROWS_CLAIMED.clone()),
        Box::new(CONNECTION_FAILURES.clone()),
        Box::new(JOBS_FINISHED.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(ACTIVE_JOBS.clone()),
    ]
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Writes the text exposition to `path`, replacing it atomically.
pub async fn write_textfile(path: &Path) -> std::io::Result<()> {
    let body = encode_metrics().map_err(std::io::Error::other)?;
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    tokio::fs::write(&staging, body).await?;
    tokio::fs::rename(&staging, path).await
}
