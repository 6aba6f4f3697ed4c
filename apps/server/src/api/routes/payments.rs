//! Payment routes

use crate::api::handlers::payments;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn payments_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/payments",
            get(payments::get_payments).post(payments::create_payment),
        )
        .route(
            "/payments/",
            get(payments::get_payments).post(payments::create_payment),
        )
        .route("/payments/:id", get(payments::get_payment))
        .route("/payments/:id/", get(payments::get_payment))
}
