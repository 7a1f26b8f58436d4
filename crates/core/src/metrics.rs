//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Jobs (outcomes, durations, rejected submits)
//! - Inputs (bytes fetched from links)
//! - Engine and result sink (initializations, live display handles)

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Registry holding every core metric.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    for metric in all_metrics() {
        // Only fails on duplicate registration, which all_metrics never produces
        let _ = registry.register(metric);
    }
    registry
});

// =============================================================================
// Jobs
// =============================================================================

/// Finished jobs by result.
pub static JOBS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("shortify_jobs_total", "Total finished conversion jobs"),
        &["result"], // "done", "input_failed", "engine_failed", "conversion_failed", "publish_failed"
    )
    .unwrap()
});

/// Job duration from submit to Done/Failed.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "shortify_job_duration_seconds",
            "Duration of conversion jobs",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        &["result"],
    )
    .unwrap()
});

/// Submits turned away before a job started.
pub static SUBMITS_REJECTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "shortify_submits_rejected_total",
            "Total submits rejected without starting a job",
        ),
        &["reason"], // "no_input", "busy"
    )
    .unwrap()
});

// =============================================================================
// Inputs
// =============================================================================

/// Bytes downloaded for link selections.
pub static BYTES_FETCHED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "shortify_bytes_fetched_total",
        "Total bytes fetched from media links",
    )
    .unwrap()
});

// =============================================================================
// Engine and results
// =============================================================================

/// Successful engine initializations.
pub static ENGINE_INITIALIZATIONS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "shortify_engine_initializations_total",
        "Total successful engine initializations",
    )
    .unwrap()
});

/// Display handles currently live in the result sink.
pub static LIVE_DISPLAY_HANDLES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "shortify_live_display_handles",
        "Display handles currently published",
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Jobs
        Box::new(JOBS_TOTAL.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(SUBMITS_REJECTED.clone()),
        // Inputs
        Box::new(BYTES_FETCHED.clone()),
        // Engine and results
        Box::new(ENGINE_INITIALIZATIONS.clone()),
        Box::new(LIVE_DISPLAY_HANDLES.clone()),
    ]
}

/// Encode all core metrics in the Prometheus text format.
pub fn gather_text() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
