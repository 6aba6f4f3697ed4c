//! Per-request context injected by middleware.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Server-generated id, returned as `x-request-id`.
    pub request_id: String,
    /// Caller-supplied id, returned as `x-correlation-id`.
    pub correlation_id: Option<String>,
}

/// Handlers can take `RequestContext` directly; outside the request-id
/// middleware it is empty.
#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}
