//! Metrics middleware - tracks HTTP request metrics

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Metrics middleware - tracks HTTP request metrics
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    // Sanitize path for metrics (remove IDs to reduce cardinality)
    let sanitized_path = crate::metrics::sanitize_path(&path);

    // Track in-flight requests
    crate::metrics::HTTP_REQUESTS_IN_FLIGHT
        .with_label_values(&[&method, &sanitized_path])
        .inc();

    if let Some(content_length) = req
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<f64>().ok())
    {
        crate::metrics::HTTP_REQUEST_SIZE_BYTES
            .with_label_values(&[&method, &sanitized_path])
            .observe(content_length);
    }

    // Process request
    let response = next.run(req).await;

    // Record metrics after request completion
    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    crate::metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &sanitized_path, &status])
        .inc();

    crate::metrics::HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &sanitized_path])
        .observe(duration);

    if let Some(entity) = crate::metrics::extract_entity(&path) {
        if let Some(operation) = crate::metrics::extract_operation(&method, &path) {
            let outcome = if response.status().is_success() {
                "success"
            } else if response.status().is_client_error() {
                "client_error"
            } else {
                "server_error"
            };

            crate::metrics::API_OPERATIONS_TOTAL
                .with_label_values(&[entity, operation, outcome])
                .inc();

            crate::metrics::API_OPERATION_DURATION_SECONDS
                .with_label_values(&[entity, operation])
                .observe(duration);
        }
    }

    // Decrement in-flight requests
    crate::metrics::HTTP_REQUESTS_IN_FLIGHT
        .with_label_values(&[&method, &sanitized_path])
        .dec();

    response
}
