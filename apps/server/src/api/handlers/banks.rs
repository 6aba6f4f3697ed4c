//! Bank handlers

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use finatech_models::{CreateBank, Filter};

use crate::{
    api::extractors::{ApiJson, ApiPath, ApiQuery},
    state::AppState,
    Error, Result,
};

pub async fn get_bank(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<impl IntoResponse> {
    let bank = state
        .bank_service
        .get_bank(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Bank with id {id} was not found.")))?;

    Ok(Json(bank))
}

pub async fn get_banks(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<Filter>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.bank_service.get_banks(&filter).await?))
}

pub async fn create_bank(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateBank>,
) -> Result<impl IntoResponse> {
    let bank = state.bank_service.create_bank(&request).await?;
    let location = format!("/banks/{}", bank.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(bank)))
}
