//! Metrics and observability utilities
//!
//! Prometheus metrics for the prediction endpoint and each outbound
//! dependency of the pipeline (search, page fetch, model).

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all AnswerForge metrics
pub const METRICS_PREFIX: &str = "answerforge";

/// Histogram buckets for request latency (in seconds)
///
/// A prediction spans a search, page fetches and a model call, so the
/// interesting range is seconds rather than milliseconds.
pub const LATENCY_BUCKETS: &[f64] = &[
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
    20.00,  // 20s
    30.00,  // 30s
    60.00,  // 60s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Search metrics
    describe_counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of web search queries"
    );

    describe_histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Web search latency in seconds"
    );

    // Fetch metrics
    describe_counter!(
        format!("{}_page_fetches_total", METRICS_PREFIX),
        Unit::Count,
        "Total source pages fetched, by outcome"
    );

    // Model metrics
    describe_counter!(
        format!("{}_model_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total model invocations, by outcome"
    );

    describe_histogram!(
        format!("{}_model_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Model invocation latency in seconds, retries included"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

fn outcome(success: bool) -> &'static str {
    if success { "success" } else { "error" }
}

/// Helper to record search metrics
pub fn record_search(duration_secs: f64, provider: &str, success: bool) {
    counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        "provider" => provider.to_string(),
        "status" => outcome(success)
    )
    .increment(1);

    if success {
        histogram!(
            format!("{}_search_duration_seconds", METRICS_PREFIX),
            "provider" => provider.to_string()
        )
        .record(duration_secs);
    }
}

/// Helper to record the final outcome of one source page
pub fn record_fetch(success: bool) {
    counter!(
        format!("{}_page_fetches_total", METRICS_PREFIX),
        "status" => outcome(success)
    )
    .increment(1);
}

/// Helper to record model metrics
pub fn record_model(duration_secs: f64, model: &str, success: bool) {
    counter!(
        format!("{}_model_requests_total", METRICS_PREFIX),
        "model" => model.to_string(),
        "status" => outcome(success)
    )
    .increment(1);

    histogram!(
        format!("{}_model_duration_seconds", METRICS_PREFIX),
        "model" => model.to_string()
    )
    .record(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }

        // Model calls time out at 60s by default
        assert_eq!(LATENCY_BUCKETS.last(), Some(&60.0));
    }

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("POST", "/api/request");
        std::thread::sleep(std::time::Duration::from_millis(10));
        metrics.finish(200);
        // No recorder installed; just verify it runs without panic
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome(true), "success");
        assert_eq!(outcome(false), "error");
        record_search(0.2, "duckduckgo", true);
        record_fetch(false);
        record_model(1.5, "gpt-4o-mini", true);
    }
}
