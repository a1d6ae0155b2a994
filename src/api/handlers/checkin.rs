//! Check-in handlers: token issuance, gate verification, revocation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CheckinResponse, CheckinStatusResponse, QrTokenResponse, RevokeTokenResponse,
    VerifyTokenRequest,
};
use crate::app_state::AppState;
use crate::domain::qr_token::QrTokenStatus;
use crate::domain::TicketId;
use crate::error::{BookingError, ErrorResponse};

/// `POST /tickets/:id/qr` — Issue a check-in token.
///
/// # Errors
///
/// Returns [`BookingError::TicketNotFound`] for an unknown ticket and
/// [`BookingError::Conflict`] when the ticket is not CONFIRMED.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/qr",
    tag = "Check-in",
    summary = "Issue a check-in token",
    description = "Issues a single-use QR token for a CONFIRMED ticket. Re-issuing revokes the previous token.",
    params(("id" = TicketId, Path, description = "Ticket ID")),
    responses(
        (status = 201, description = "Token issued", body = QrTokenResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse),
        (status = 409, description = "Ticket is not confirmed", body = ErrorResponse),
    )
)]
pub async fn generate_token(
    State(state): State<AppState>,
    Path(id): Path<TicketId>,
) -> Result<impl IntoResponse, BookingError> {
    let token = state.checkin_service.generate(id).await?;
    Ok((
        StatusCode::CREATED,
        Json(QrTokenResponse {
            ticket_id: token.ticket_id,
            token: token.token,
            expires_at: token.expires_at,
            status: token.status,
        }),
    ))
}

/// `POST /checkin` — Verify a scanned token and admit the party.
///
/// # Errors
///
/// Returns a token error (not found, expired, used, revoked) or
/// [`BookingError::Conflict`] when the ticket is no longer CONFIRMED.
#[utoipa::path(
    post,
    path = "/api/v1/checkin",
    tag = "Check-in",
    summary = "Verify a check-in token",
    description = "Consumes a scanned token. The first successful scan admits the party; every later scan of the same token is rejected.",
    request_body = VerifyTokenRequest,
    responses(
        (status = 200, description = "Party admitted", body = CheckinResponse),
        (status = 404, description = "Unknown token", body = ErrorResponse),
        (status = 409, description = "Token already used or revoked, or ticket not confirmed", body = ErrorResponse),
        (status = 410, description = "Token expired", body = ErrorResponse),
    )
)]
pub async fn verify_token(
    State(state): State<AppState>,
    Json(req): Json<VerifyTokenRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let summary = state.checkin_service.verify(&req.token).await?;
    Ok(Json(CheckinResponse::from(summary)))
}

/// `POST /tickets/:id/qr/revoke` — Revoke the live token of a ticket.
///
/// # Errors
///
/// Returns [`BookingError::TicketNotFound`] for an unknown ticket and
/// [`BookingError::Conflict`] when the token has already admitted.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/qr/revoke",
    tag = "Check-in",
    summary = "Revoke a check-in token",
    params(("id" = TicketId, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Revocation result", body = RevokeTokenResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse),
        (status = 409, description = "Token already used", body = ErrorResponse),
    )
)]
pub async fn revoke_token(
    State(state): State<AppState>,
    Path(id): Path<TicketId>,
) -> Result<impl IntoResponse, BookingError> {
    let revoked = state.checkin_service.revoke(id).await?;
    Ok(Json(RevokeTokenResponse {
        ticket_id: id,
        revoked,
    }))
}

/// `GET /tickets/:id/checkin` — Check-in status of a ticket.
///
/// # Errors
///
/// Returns [`BookingError::TicketNotFound`] for an unknown ticket.
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}/checkin",
    tag = "Check-in",
    summary = "Get check-in status",
    params(("id" = TicketId, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Check-in status", body = CheckinStatusResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse),
    )
)]
pub async fn checkin_status(
    State(state): State<AppState>,
    Path(id): Path<TicketId>,
) -> Result<impl IntoResponse, BookingError> {
    let token = state.checkin_service.token_status(id).await?;
    let checked_in = token
        .as_ref()
        .is_some_and(|t| t.status == QrTokenStatus::Used);
    Ok(Json(CheckinStatusResponse {
        ticket_id: id,
        token_issued: token.is_some(),
        token_status: token.as_ref().map(|t| t.status),
        token_expires_at: token.as_ref().map(|t| t.expires_at),
        checked_in,
    }))
}

/// Check-in resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tickets/{id}/qr", post(generate_token))
        .route("/tickets/{id}/qr/revoke", post(revoke_token))
        .route("/tickets/{id}/checkin", get(checkin_status))
        .route("/checkin", post(verify_token))
}
