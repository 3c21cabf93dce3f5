//! Metrics definitions for the pagination engine.
//!
//! Metrics are collected using the `metrics` crate and can be exported
//! to Prometheus via `metrics-exporter-prometheus`.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

/// Initialize all metric descriptions.
/// Call this once at startup before any metrics are recorded.
pub fn init_metrics() {
    describe_counter!(
        "pages_served_total",
        "Total number of connection pages served"
    );
    describe_counter!(
        "page_probes_total",
        "Total number of has-previous/has-next existence probes issued"
    );
    describe_histogram!(
        "page_query_duration_seconds",
        "Time taken to resolve a full connection in seconds"
    );
    describe_counter!(
        "paging_errors_total",
        "Total number of paging requests that failed"
    );
}

/// Record a served page.
///
/// # Arguments
/// * `direction` - "forward" or "backward"
pub fn record_page_served(direction: &'static str) {
    counter!("pages_served_total", "direction" => direction).increment(1);
}

/// Record an existence probe ("previous" or "next").
pub fn record_page_probe(kind: &'static str) {
    counter!("page_probes_total", "kind" => kind).increment(1);
}

/// Record a failed paging request by error kind.
pub fn record_paging_error(kind: &'static str) {
    counter!("paging_errors_total", "kind" => kind).increment(1);
}

/// Record connection resolution duration.
pub fn record_page_query_duration(duration_secs: f64) {
    histogram!("page_query_duration_seconds").record(duration_secs);
}

/// A timer that records the connection duration when dropped.
pub struct PageTimer {
    start: Instant,
}

impl PageTimer {
    /// Start a new page timer.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for PageTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PageTimer {
    fn drop(&mut self) {
        record_page_query_duration(self.start.elapsed().as_secs_f64());
    }
}
