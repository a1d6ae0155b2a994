//! Deposit handlers: status reads and payment recording.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{DepositResponse, RecordPaymentRequest};
use crate::app_state::AppState;
use crate::domain::DepositId;
use crate::error::{BookingError, ErrorResponse};

/// `GET /deposits/:id` — Deposit status.
///
/// # Errors
///
/// Returns [`BookingError::DepositNotFound`] for an unknown ID.
#[utoipa::path(
    get,
    path = "/api/v1/deposits/{id}",
    tag = "Deposits",
    summary = "Get a deposit",
    params(("id" = DepositId, Path, description = "Deposit ID")),
    responses(
        (status = 200, description = "Deposit detail", body = DepositResponse),
        (status = 404, description = "Deposit not found", body = ErrorResponse),
    )
)]
pub async fn get_deposit(
    State(state): State<AppState>,
    Path(id): Path<DepositId>,
) -> Result<impl IntoResponse, BookingError> {
    let snapshot = state.booking_service.deposit_snapshot(id).await?;
    Ok(Json(DepositResponse::from(snapshot)))
}

/// `POST /deposits/:id/payments` — Record a payment.
///
/// # Errors
///
/// Returns [`BookingError::Validation`] for a non-positive amount,
/// [`BookingError::DepositNotFound`] for an unknown ID, and
/// [`BookingError::Conflict`] when the deposit is already paid or the
/// ticket is no longer PENDING.
#[utoipa::path(
    post,
    path = "/api/v1/deposits/{id}/payments",
    tag = "Deposits",
    summary = "Record a payment",
    description = "Applies a payment to a deposit. Reaching the required amount marks the deposit PAID and confirms the ticket; a smaller amount leaves it PARTIAL with the capacity still held.",
    params(("id" = DepositId, Path, description = "Deposit ID")),
    request_body = RecordPaymentRequest,
    responses(
        (status = 200, description = "Updated deposit", body = DepositResponse),
        (status = 400, description = "Non-positive amount", body = ErrorResponse),
        (status = 404, description = "Deposit not found", body = ErrorResponse),
        (status = 409, description = "Deposit already paid or ticket no longer pending", body = ErrorResponse),
    )
)]
pub async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<DepositId>,
    Json(req): Json<RecordPaymentRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let snapshot = state.booking_service.record_payment(id, req.amount).await?;
    Ok(Json(DepositResponse::from(snapshot)))
}

/// Deposit resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/deposits/{id}", get(get_deposit))
        .route("/deposits/{id}/payments", post(record_payment))
}
