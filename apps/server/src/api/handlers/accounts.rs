//! Account handlers

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use finatech_models::{CreateAccount, Filter};

use crate::{
    api::extractors::{ApiJson, ApiPath, ApiQuery},
    state::AppState,
    Error, Result,
};

pub async fn get_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<impl IntoResponse> {
    let account = state
        .account_service
        .get_account(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Account with id {id} was not found.")))?;

    Ok(Json(account))
}

pub async fn get_accounts(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<Filter>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.account_service.get_accounts(&filter).await?))
}

pub async fn create_account(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAccount>,
) -> Result<impl IntoResponse> {
    let account = state.account_service.create_account(&request).await?;
    let location = format!("/accounts/{}", account.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(account),
    ))
}
