//! Prometheus metrics for core components.

use once_cell::sync::Lazy;
use prometheus::core::Collector;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

/// Jobs processed by the worker, by result.
pub static JOBS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("darkroom_jobs_processed_total", "Total jobs processed"),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

/// Wall-clock job processing duration in seconds, by transformation kind.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "darkroom_job_duration_seconds",
            "Duration of job processing",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["transformation"],
    )
    .unwrap()
});

/// Artifacts written to the object store, by suffix.
pub static ARTIFACTS_STORED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("darkroom_artifacts_stored_total", "Total artifacts stored"),
        &["suffix"], // "original", "rotated", "gray", "scaled"
    )
    .unwrap()
});

/// All core metrics, for registration into the server's registry.
pub fn all_metrics() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(JOBS_PROCESSED.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(ARTIFACTS_STORED.clone()),
    ]
}
