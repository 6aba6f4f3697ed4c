//! Layer factories for middleware

use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// HTTP-level trace events at debug level.
///
/// The per-request root span comes from `request_id_middleware`; this layer
/// adds tower-http's request/response events inside it.
pub fn trace() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG))
}

/// CORS middleware
pub fn cors(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new();
    }

    let mut header_values = Vec::with_capacity(origins.len());
    for origin in origins {
        match axum::http::HeaderValue::from_str(origin) {
            Ok(value) => header_values.push(value),
            Err(_) => tracing::warn!(origin = %origin, "Ignoring invalid CORS origin"),
        }
    }

    // Every configured origin was unparsable
    if header_values.is_empty() {
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(header_values))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Compression middleware
pub fn compression() -> CompressionLayer {
    CompressionLayer::new()
}
