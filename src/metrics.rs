//! Metrics collection for summary runs
//!
//! Prometheus counters and histograms for files summarized, batch durations and sink
//! writes, registered in the default registry.

use std::time::Duration;

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Counter for summarized files
    static ref FILES_SUMMARIZED: IntCounterVec = register_int_counter_vec!(
        "sales_files_summarized_total",
        "Total number of files summarized",
        &["status"]
    ).unwrap();

    /// Histogram for worker batch duration
    static ref BATCH_DURATION: HistogramVec = register_histogram_vec!(
        "sales_batch_duration_seconds",
        "Worker batch duration in seconds",
        &["worker_id"],
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0]
    ).unwrap();

    /// Counter for sink writes
    static ref SINK_WRITES: IntCounterVec = register_int_counter_vec!(
        "sales_sink_writes_total",
        "Total number of sink writes",
        &["kind", "status"]
    ).unwrap();
}

fn status(ok: bool) -> &'static str {
    if ok {
        "success"
    } else {
        "failure"
    }
}

/// Record one file summary attempt
pub fn record_file(ok: bool) {
    FILES_SUMMARIZED.with_label_values(&[status(ok)]).inc();
}

/// Record a completed worker batch
pub fn record_batch(worker_id: usize, elapsed: Duration) {
    let worker = worker_id.to_string();
    BATCH_DURATION
        .with_label_values(&[worker.as_str()])
        .observe(elapsed.as_secs_f64());
}

/// Record one sink write of `kind` (`persist` or `visualize`)
pub fn record_sink_write(kind: &str, ok: bool) {
    SINK_WRITES.with_label_values(&[kind, status(ok)]).inc();
}

/// Files summarized so far with the given outcome
pub fn files_summarized(ok: bool) -> u64 {
    FILES_SUMMARIZED.with_label_values(&[status(ok)]).get()
}

/// Sink writes of `kind` so far with the given outcome
pub fn sink_writes(kind: &str, ok: bool) -> u64 {
    SINK_WRITES.with_label_values(&[kind, status(ok)]).get()
}

/// Render every registered metric in the Prometheus text format
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
