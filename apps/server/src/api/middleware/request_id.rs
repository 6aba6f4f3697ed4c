//! Request and correlation ids, plus the root span every request runs in.
//!
//! Payment clients often retry through gateways that stamp their own ids, so
//! the server never trusts an incoming id as its own `x-request-id`. The
//! caller's id is kept separately as the correlation id and echoed back.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::TraceContextExt;
use std::time::Instant;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use uuid::Uuid;

use crate::request_context::RequestContext;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Longer client ids are dropped rather than truncated.
const MAX_CORRELATION_ID_LEN: usize = 128;

/// Opens the `http_request` span and stamps the ids on the response.
///
/// * `x-request-id` is always a fresh server-generated UUID.
/// * `x-correlation-id` echoes the caller's `x-correlation-id`, or failing
///   that its `x-request-id`, when the value is printable ASCII of at most
///   128 bytes.
/// * `x-trace-id` carries the OpenTelemetry trace id.
#[tracing::instrument(
    name = "http_request",
    skip_all,
    fields(
        http.method = %req.method(),
        http.route = %req.uri().path(),
        http.scheme = %req.uri().scheme_str().unwrap_or("http"),
        otel.kind = "server",
        http.response.status_code = tracing::field::Empty,
        api.entity = tracing::field::Empty,
        api.operation = tracing::field::Empty,
        request_id = tracing::field::Empty,
        correlation_id = tracing::field::Empty,
    )
)]
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let span = Span::current();
    let start = Instant::now();

    let request_id = Uuid::new_v4().to_string();
    let correlation_id = client_correlation_id(req.headers());
    span.record("request_id", &request_id);
    if let Some(correlation_id) = &correlation_id {
        span.record("correlation_id", correlation_id.as_str());
    }

    req.extensions_mut().insert(RequestContext {
        request_id: request_id.clone(),
        correlation_id: correlation_id.clone(),
    });

    let path = req.uri().path().to_string();
    let method = req.method().clone();
    if let Some(entity) = crate::metrics::extract_entity(&path) {
        span.record("api.entity", entity);
    }
    if let Some(operation) = crate::metrics::extract_operation(method.as_str(), &path) {
        span.record("api.operation", operation);
    }

    tracing::debug!(method = %method, path = %path, "Incoming request");

    let mut response = next.run(req).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis();
    span.record("http.response.status_code", status.as_u16());

    if status.is_server_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms,
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms,
            "Request completed"
        );
    }

    let trace_id = span.context().span().span_context().trace_id().to_string();

    let headers = response.headers_mut();
    for (name, value) in [
        (REQUEST_ID_HEADER, Some(request_id.as_str())),
        (TRACE_ID_HEADER, Some(trace_id.as_str())),
        (CORRELATION_ID_HEADER, correlation_id.as_deref()),
    ] {
        if let Some(value) = value.and_then(|v| HeaderValue::from_str(v).ok()) {
            headers.insert(name, value);
        }
    }

    response
}

/// The caller's id for this request, if it sent a usable one.
fn client_correlation_id(headers: &HeaderMap) -> Option<String> {
    [CORRELATION_ID_HEADER, REQUEST_ID_HEADER]
        .into_iter()
        .filter_map(|name| headers.get(name)?.to_str().ok())
        .map(str::trim)
        .find(|id| is_acceptable_id(id))
        .map(String::from)
}

fn is_acceptable_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_CORRELATION_ID_LEN
        && id.bytes().all(|b| b.is_ascii_graphic())
}
