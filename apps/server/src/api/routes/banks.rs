//! Bank routes

use crate::api::handlers::banks;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn banks_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/banks",
            get(banks::get_banks).post(banks::create_bank),
        )
        .route(
            "/banks/",
            get(banks::get_banks).post(banks::create_bank),
        )
        .route("/banks/:id", get(banks::get_bank))
        .route("/banks/:id/", get(banks::get_bank))
}
