//! Response headers for an API that serves account and payment data.

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Headers set on every response. The API only returns JSON, so nothing may
/// be framed, sniffed or loaded as a subresource.
const BASELINE: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "no-referrer"),
    ("content-security-policy", "default-src 'none'; frame-ancestors 'none'"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-site"),
];

const HSTS: &str = "max-age=31536000; includeSubDomains";

/// Adds baseline security headers and keeps banking data out of caches.
///
/// IBANs, names and addresses must not be stored by browsers or shared
/// proxies, so `cache-control: no-store` is added unless a handler chose its
/// own caching policy. HSTS is sent only when the request arrived over HTTPS,
/// directly or through a proxy that set `x-forwarded-proto`.
pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let https = is_https(&req);

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for &(name, value) in BASELINE {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }

    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    }

    if https {
        headers.insert(header::STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS));
    }

    response
}

fn is_https(req: &Request) -> bool {
    forwarded_proto_is_https(req.headers())
        || req
            .uri()
            .scheme_str()
            .is_some_and(|s| s.eq_ignore_ascii_case("https"))
}

// Proxies may append, e.g. "https, http"; the first hop is the client's.
fn forwarded_proto_is_https(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}
