//! API layer - routes, handlers, and middleware

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;

use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.server.max_request_body_size;
    let cors_origins = state.config.server.cors_origins.clone();

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        // 204 keeps browser favicon requests out of the 404 logs
        .route("/favicon.ico", get(favicon))
        .merge(routes::metrics::metrics_routes())
        .merge(routes::payments::payments_routes())
        .merge(routes::accounts::accounts_routes())
        .merge(routes::banks::banks_routes())
        .with_state(state)
        // Applied in reverse order
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(middleware::trace())
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(axum::middleware::from_fn(middleware::metrics_middleware))
        .layer(middleware::compression())
        .layer(middleware::cors(&cors_origins))
        .layer(DefaultBodyLimit::max(max_body_size))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "finatech-server"
    }))
}

async fn root(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "server": "FinaTech Payments Server",
            "version": env!("CARGO_PKG_VERSION"),
            "storage": state.config.database.backend,
            "status": "running"
        })),
    )
}

async fn favicon() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
