//! Payment handlers

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use finatech_models::{CreatePayment, PaymentFilter};

use crate::{
    api::extractors::{ApiJson, ApiPath, ApiQuery},
    request_context::RequestContext,
    state::AppState,
    Error, Result,
};

pub async fn get_payment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<impl IntoResponse> {
    let payment = state
        .payment_service
        .get_payment(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Payment with id {id} was not found.")))?;

    Ok(Json(payment))
}

pub async fn get_payments(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<PaymentFilter>,
) -> Result<impl IntoResponse> {
    let page = state.payment_service.get_payments(&filter).await?;
    Ok(Json(page))
}

pub async fn create_payment(
    State(state): State<AppState>,
    context: RequestContext,
    ApiJson(request): ApiJson<CreatePayment>,
) -> Result<impl IntoResponse> {
    let payment = state.payment_service.create_payment(&request).await?;

    tracing::debug!(
        request_id = %context.request_id,
        correlation_id = ?context.correlation_id,
        payment_id = payment.id,
        "Responding with created payment"
    );
    let location = format!("/payments/{}", payment.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(payment),
    ))
}
