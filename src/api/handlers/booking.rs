//! Ticket handlers: create, read, cancel.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{CreateTicketRequest, TicketResponse};
use crate::app_state::AppState;
use crate::domain::TicketId;
use crate::error::{BookingError, ErrorResponse};
use crate::service::NewTicket;

/// `POST /tickets` — Book a slot.
///
/// # Errors
///
/// Returns [`BookingError`] on validation failure, unknown references,
/// or insufficient capacity.
#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    tag = "Tickets",
    summary = "Create a ticket",
    description = "Reserves capacity on a slot, prices the booking, and derives the deposit. The ticket starts PENDING with a hold deadline, or CONFIRMED immediately when no deposit is required.",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket created", body = TicketResponse),
        (status = 400, description = "Validation failure", body = ErrorResponse),
        (status = 404, description = "Unknown contact, experience, slot, or route", body = ErrorResponse),
        (status = 422, description = "Insufficient slot capacity", body = ErrorResponse),
    )
)]
pub async fn create_ticket(
    State(state): State<AppState>,
    Json(req): Json<CreateTicketRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let snapshot = state
        .booking_service
        .create_ticket(NewTicket {
            contact_id: req.contact_id,
            experience_id: req.experience_id,
            slot_id: req.slot_id,
            party_size: req.party_size,
            route_id: req.route_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(TicketResponse::from(snapshot))))
}

/// `GET /tickets/:id` — Ticket summary.
///
/// # Errors
///
/// Returns [`BookingError::TicketNotFound`] for an unknown ID.
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}",
    tag = "Tickets",
    summary = "Get a ticket",
    params(("id" = TicketId, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket detail", body = TicketResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse),
    )
)]
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<TicketId>,
) -> Result<impl IntoResponse, BookingError> {
    let snapshot = state.booking_service.ticket_snapshot(id).await?;
    Ok(Json(TicketResponse::from(snapshot)))
}

/// `POST /tickets/:id/cancel` — Cancel a ticket.
///
/// # Errors
///
/// Returns [`BookingError::TicketNotFound`] for an unknown ID and
/// [`BookingError::Conflict`] for a ticket already in a terminal state.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/cancel",
    tag = "Tickets",
    summary = "Cancel a ticket",
    description = "Cancels a PENDING or CONFIRMED ticket, releasing its capacity and revoking any live check-in token.",
    params(("id" = TicketId, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Cancelled ticket", body = TicketResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse),
        (status = 409, description = "Ticket already expired or cancelled", body = ErrorResponse),
    )
)]
pub async fn cancel_ticket(
    State(state): State<AppState>,
    Path(id): Path<TicketId>,
) -> Result<impl IntoResponse, BookingError> {
    let snapshot = state.booking_service.cancel(id).await?;
    Ok(Json(TicketResponse::from(snapshot)))
}

/// Ticket resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", post(create_ticket))
        .route("/tickets/{id}", get(get_ticket))
        .route("/tickets/{id}/cancel", post(cancel_ticket))
}
