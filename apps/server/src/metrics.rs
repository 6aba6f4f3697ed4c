//! Metrics collection for the payments server
//!
//! Prometheus metrics registered in the default registry and exposed at `/metrics`.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec,
    register_int_gauge_vec, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec,
};

lazy_static! {
    // HTTP Request Metrics

    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "finatech_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUESTS_TOTAL");

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "finatech_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");

    /// In-flight HTTP requests
    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGaugeVec = register_int_gauge_vec!(
        "finatech_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
        &["method", "path"]
    )
    .expect("Failed to register HTTP_REQUESTS_IN_FLIGHT");

    /// HTTP request body size in bytes
    pub static ref HTTP_REQUEST_SIZE_BYTES: HistogramVec = register_histogram_vec!(
        "finatech_http_request_size_bytes",
        "HTTP request body size in bytes",
        &["method", "path"],
        vec![100.0, 1_000.0, 10_000.0, 100_000.0, 1_000_000.0]
    )
    .expect("Failed to register HTTP_REQUEST_SIZE_BYTES");

    // API Operation Metrics

    /// Operations by entity (payments, accounts, banks) and kind (read, list, create)
    pub static ref API_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "finatech_api_operations_total",
        "Total number of API operations",
        &["entity", "operation", "status"]
    )
    .expect("Failed to register API_OPERATIONS_TOTAL");

    /// Operation duration
    pub static ref API_OPERATION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "finatech_api_operation_duration_seconds",
        "API operation duration in seconds",
        &["entity", "operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register API_OPERATION_DURATION_SECONDS");

    // Domain Metrics

    /// Payments committed
    pub static ref PAYMENTS_CREATED_TOTAL: IntCounter = register_int_counter!(
        "finatech_payments_created_total",
        "Total number of payments created"
    )
    .expect("Failed to register PAYMENTS_CREATED_TOTAL");

    /// Accounts inserted, either directly or while creating a payment
    pub static ref ACCOUNTS_CREATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "finatech_accounts_created_total",
        "Total number of accounts created",
        &["source"]
    )
    .expect("Failed to register ACCOUNTS_CREATED_TOTAL");

    /// Requests rejected by validation
    pub static ref VALIDATION_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "finatech_validation_failures_total",
        "Total number of requests rejected by validation",
        &["entity"]
    )
    .expect("Failed to register VALIDATION_FAILURES_TOTAL");

    // Database Metrics

    /// Storage errors by operation
    pub static ref DB_QUERY_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "finatech_db_query_errors_total",
        "Total number of storage errors",
        &["operation"]
    )
    .expect("Failed to register DB_QUERY_ERRORS_TOTAL");
}

const ENTITIES: [&str; 3] = ["payments", "accounts", "banks"];

/// Collapse numeric id segments so `/payments/42` is labelled `/payments/{id}`.
pub fn sanitize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }

    trimmed
        .split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Extract the entity collection from a request path.
pub fn extract_entity(path: &str) -> Option<&'static str> {
    let first = path.split('/').find(|s| !s.is_empty())?;
    ENTITIES.iter().copied().find(|entity| *entity == first)
}

/// Classify a request against an entity collection.
pub fn extract_operation(method: &str, path: &str) -> Option<&'static str> {
    extract_entity(path)?;
    let segments = path.split('/').filter(|s| !s.is_empty()).count();

    match (method, segments) {
        ("GET", 1) => Some("list"),
        ("GET", 2) => Some("read"),
        ("POST", 1) => Some("create"),
        _ => None,
    }
}
