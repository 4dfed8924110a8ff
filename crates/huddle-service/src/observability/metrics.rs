//! Metrics definitions for the huddle service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `hs_` prefix for the huddle service
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: 7 values max (GET, POST, PATCH, DELETE, PUT, HEAD, OPTIONS)
//! - `endpoint`: parameterized paths, unknown paths collapse to "/other"
//! - `status`: 3 values (success, error, timeout)
//! - `operation`: bounded by code (save_session, save_log, get_summary)

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded. Histogram buckets
/// target p95 < 200ms for HTTP requests and p99 < 50ms for DB queries.
///
/// # Errors
///
/// Returns error if the Prometheus recorder fails to install (e.g.,
/// already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("hs_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("hs_db_query".to_string()),
            &[
                0.001, 0.002, 0.005, 0.010, 0.020, 0.050, 0.100, 0.250, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set DB query buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `hs_http_requests_total`, `hs_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
///
/// Captures ALL HTTP responses including framework-level errors like
/// 400 (JSON parse), 404, 405 and 415, since the middleware recording
/// this is the outermost layer.
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    // Normalize endpoint to prevent cardinality explosion
    let normalized_endpoint = normalize_endpoint(endpoint);

    let status = categorize_status_code(status_code);

    histogram!("hs_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("hs_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to prevent label cardinality explosion
///
/// Replaces the dynamic huddle id segment with a placeholder.
fn normalize_endpoint(path: &str) -> String {
    match path {
        "/" => "/".to_string(),
        "/health" => "/health".to_string(),
        "/ready" => "/ready".to_string(),
        "/metrics" => "/metrics".to_string(),
        "/api/v1/huddles" => "/api/v1/huddles".to_string(),
        _ => normalize_dynamic_endpoint(path),
    }
}

/// Normalize paths with dynamic segments
fn normalize_dynamic_endpoint(path: &str) -> String {
    // Huddle endpoints: /api/v1/huddles/{id}/events and
    // /api/v1/huddles/{id}/summary
    if path.starts_with("/api/v1/huddles/") {
        let parts: Vec<&str> = path.split('/').collect();

        if parts.len() == 6 {
            if let Some(action) = parts.get(5) {
                if *action == "events" {
                    return "/api/v1/huddles/{id}/events".to_string();
                }
                if *action == "summary" {
                    return "/api/v1/huddles/{id}/summary".to_string();
                }
            }
        }
    }

    // Unknown paths normalized to "/other" to bound cardinality
    "/other".to_string()
}

// ============================================================================
// Database Metrics
// ============================================================================

/// Record database query execution
///
/// Metric: `hs_db_query_duration_seconds`, `hs_db_queries_total`
/// Labels: `operation`, `status`
///
/// Operations: save_session, save_log, get_summary
pub fn record_db_query(operation: &str, status: &str, duration: Duration) {
    histogram!("hs_db_query_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("hs_db_queries_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Huddle Operation Metrics
// ============================================================================

/// Record huddle creation outcome
///
/// Metric: `hs_huddle_starts_total`
/// Labels: `status`
pub fn record_huddle_start(status: &str, duration: Duration) {
    histogram!("hs_huddle_start_duration_seconds").record(duration.as_secs_f64());

    counter!("hs_huddle_starts_total",
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record event append outcome
///
/// Metric: `hs_events_logged_total`
/// Labels: `status`, `error_type` ("none", "encoding", "database",
/// "bad_request")
pub fn record_event_logged(status: &str, error_type: Option<&str>, duration: Duration) {
    let error_type = error_type.unwrap_or("none");

    histogram!("hs_event_log_duration_seconds").record(duration.as_secs_f64());

    counter!("hs_events_logged_total",
        "status" => status.to_string(),
        "error_type" => error_type.to_string()
    )
    .increment(1);
}

/// Record summary query outcome
///
/// Metric: `hs_summary_queries_total`
/// Labels: `status`
pub fn record_summary_query(status: &str, duration: Duration) {
    histogram!("hs_summary_query_duration_seconds").record(duration.as_secs_f64());

    counter!("hs_summary_queries_total",
        "status" => status.to_string()
    )
    .increment(1);
}
