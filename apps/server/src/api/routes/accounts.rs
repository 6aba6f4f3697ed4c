//! Account routes

use crate::api::handlers::accounts;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn accounts_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/accounts",
            get(accounts::get_accounts).post(accounts::create_account),
        )
        .route(
            "/accounts/",
            get(accounts::get_accounts).post(accounts::create_account),
        )
        .route("/accounts/:id", get(accounts::get_account))
        .route("/accounts/:id/", get(accounts::get_account))
}
