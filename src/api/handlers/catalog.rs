//! Catalog handlers: experiences, slots, availability, routes, contacts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::api::dto::{
    AvailabilityParams, AvailabilityResponse, ContactResponse, CreateContactRequest,
    CreateExperienceRequest, CreateRouteRequest, CreateSlotRequest, ExperienceResponse,
    RouteResponse, SlotAvailabilityDto, SlotResponse, UpdateExperienceStatusRequest,
};
use crate::app_state::AppState;
use crate::domain::catalog::{Contact, Experience, ExperienceSlot, ExperienceStatus, Route};
use crate::domain::{ContactId, ExperienceId, RouteId, SlotId};
use crate::error::{BookingError, ErrorResponse};

fn experience_response(e: Experience) -> ExperienceResponse {
    ExperienceResponse {
        experience_id: e.id,
        name: e.name,
        individual_price: e.individual_price,
        route_price: e.route_price,
        deposit_policy: e.deposit_policy,
        deposit_ttl_hours: e.deposit_ttl_hours,
        status: e.status,
    }
}

fn route_response(r: Route) -> RouteResponse {
    RouteResponse {
        route_id: r.id,
        name: r.name,
        price_mode: r.price_mode,
        price: r.price,
        min_party_for_flat: r.min_party_for_flat,
        experience_ids: r.experience_ids,
    }
}

/// `POST /experiences` — Create an experience.
///
/// # Errors
///
/// Returns [`BookingError`] on invalid pricing or deposit policy.
#[utoipa::path(
    post,
    path = "/api/v1/experiences",
    tag = "Catalog",
    summary = "Create an experience",
    description = "Creates a bookable experience with its pricing and deposit policy. New experiences start ONLINE.",
    request_body = CreateExperienceRequest,
    responses(
        (status = 201, description = "Experience created", body = ExperienceResponse),
        (status = 400, description = "Invalid price or deposit policy", body = ErrorResponse),
    )
)]
pub async fn create_experience(
    State(state): State<AppState>,
    Json(req): Json<CreateExperienceRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let experience = Experience {
        id: ExperienceId::new(),
        name: req.name,
        individual_price: req.individual_price,
        route_price: req.route_price,
        deposit_policy: req.deposit_policy,
        deposit_ttl_hours: req.deposit_ttl_hours,
        status: ExperienceStatus::Online,
    };
    let id = state
        .booking_service
        .catalog()
        .insert_experience(experience)
        .await?;
    let created = state.booking_service.catalog().experience(id).await?;
    Ok((StatusCode::CREATED, Json(experience_response(created))))
}

/// `GET /experiences/:id` — Get an experience.
///
/// # Errors
///
/// Returns [`BookingError::ExperienceNotFound`] for an unknown ID.
#[utoipa::path(
    get,
    path = "/api/v1/experiences/{id}",
    tag = "Catalog",
    summary = "Get an experience",
    params(("id" = ExperienceId, Path, description = "Experience ID")),
    responses(
        (status = 200, description = "Experience detail", body = ExperienceResponse),
        (status = 404, description = "Experience not found", body = ErrorResponse),
    )
)]
pub async fn get_experience(
    State(state): State<AppState>,
    Path(id): Path<ExperienceId>,
) -> Result<impl IntoResponse, BookingError> {
    let experience = state.booking_service.catalog().experience(id).await?;
    Ok(Json(experience_response(experience)))
}

/// `PATCH /experiences/:id/status` — Toggle ONLINE/OFFLINE.
///
/// # Errors
///
/// Returns [`BookingError::ExperienceNotFound`] for an unknown ID.
#[utoipa::path(
    patch,
    path = "/api/v1/experiences/{id}/status",
    tag = "Catalog",
    summary = "Set experience publication status",
    description = "OFFLINE experiences reject new bookings; existing tickets are unaffected.",
    params(("id" = ExperienceId, Path, description = "Experience ID")),
    request_body = UpdateExperienceStatusRequest,
    responses(
        (status = 200, description = "Updated experience", body = ExperienceResponse),
        (status = 404, description = "Experience not found", body = ErrorResponse),
    )
)]
pub async fn update_experience_status(
    State(state): State<AppState>,
    Path(id): Path<ExperienceId>,
    Json(req): Json<UpdateExperienceStatusRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let updated = state
        .booking_service
        .catalog()
        .set_experience_status(id, req.status)
        .await?;
    Ok(Json(experience_response(updated)))
}

/// `POST /experiences/:id/slots` — Create a slot for an experience.
///
/// # Errors
///
/// Returns [`BookingError`] for an unknown experience or zero capacity.
#[utoipa::path(
    post,
    path = "/api/v1/experiences/{id}/slots",
    tag = "Catalog",
    summary = "Create a slot",
    description = "Adds a dated, timed slot with a hard capacity ceiling to an experience.",
    params(("id" = ExperienceId, Path, description = "Experience ID")),
    request_body = CreateSlotRequest,
    responses(
        (status = 201, description = "Slot created", body = SlotResponse),
        (status = 400, description = "Invalid capacity", body = ErrorResponse),
        (status = 404, description = "Experience not found", body = ErrorResponse),
    )
)]
pub async fn create_slot(
    State(state): State<AppState>,
    Path(experience_id): Path<ExperienceId>,
    Json(req): Json<CreateSlotRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let slot = ExperienceSlot {
        id: SlotId::new(),
        experience_id,
        date: req.date,
        time: req.time,
        max_capacity: req.max_capacity,
    };
    let slot_id = state.booking_service.create_slot(slot).await?;
    Ok((
        StatusCode::CREATED,
        Json(SlotResponse {
            slot_id,
            experience_id,
            date: req.date,
            time: req.time,
            max_capacity: req.max_capacity,
        }),
    ))
}

/// `GET /experiences/:id/slots` — Slots with live availability.
///
/// # Errors
///
/// Returns [`BookingError::ExperienceNotFound`] for an unknown ID.
#[utoipa::path(
    get,
    path = "/api/v1/experiences/{id}/slots",
    tag = "Catalog",
    summary = "Query slot availability",
    description = "Lists the slots of an experience with their currently available capacity, optionally filtered to one date.",
    params(
        ("id" = ExperienceId, Path, description = "Experience ID"),
        AvailabilityParams,
    ),
    responses(
        (status = 200, description = "Slots with availability", body = AvailabilityResponse),
        (status = 404, description = "Experience not found", body = ErrorResponse),
    )
)]
pub async fn list_availability(
    State(state): State<AppState>,
    Path(experience_id): Path<ExperienceId>,
    Query(params): Query<AvailabilityParams>,
) -> Result<impl IntoResponse, BookingError> {
    let slots = state
        .booking_service
        .availability(experience_id, params.date)
        .await?;
    let slots = slots
        .into_iter()
        .map(|s| SlotAvailabilityDto {
            slot_id: s.slot.id,
            date: s.slot.date,
            time: s.slot.time,
            max_capacity: s.slot.max_capacity,
            available_capacity: s.available_capacity,
            is_available: s.available_capacity > 0,
        })
        .collect();
    Ok(Json(AvailabilityResponse {
        experience_id,
        slots,
    }))
}

/// `POST /routes` — Create a route bundle.
///
/// # Errors
///
/// Returns [`BookingError`] for unknown members or an invalid flat price.
#[utoipa::path(
    post,
    path = "/api/v1/routes",
    tag = "Catalog",
    summary = "Create a route",
    description = "Creates a multi-experience bundle with sum or flat pricing.",
    request_body = CreateRouteRequest,
    responses(
        (status = 201, description = "Route created", body = RouteResponse),
        (status = 400, description = "Invalid route definition", body = ErrorResponse),
    )
)]
pub async fn create_route(
    State(state): State<AppState>,
    Json(req): Json<CreateRouteRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let route = Route {
        id: RouteId::new(),
        name: req.name,
        price_mode: req.price_mode,
        price: req.price,
        min_party_for_flat: req.min_party_for_flat,
        experience_ids: req.experience_ids,
    };
    let id = state.booking_service.catalog().insert_route(route).await?;
    let created = state.booking_service.catalog().route(id).await?;
    Ok((StatusCode::CREATED, Json(route_response(created))))
}

/// `GET /routes/:id` — Get a route.
///
/// # Errors
///
/// Returns [`BookingError::RouteNotFound`] for an unknown ID.
#[utoipa::path(
    get,
    path = "/api/v1/routes/{id}",
    tag = "Catalog",
    summary = "Get a route",
    params(("id" = RouteId, Path, description = "Route ID")),
    responses(
        (status = 200, description = "Route detail", body = RouteResponse),
        (status = 404, description = "Route not found", body = ErrorResponse),
    )
)]
pub async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<RouteId>,
) -> Result<impl IntoResponse, BookingError> {
    let route = state.booking_service.catalog().route(id).await?;
    Ok(Json(route_response(route)))
}

/// `POST /contacts` — Create a contact.
#[utoipa::path(
    post,
    path = "/api/v1/contacts",
    tag = "Catalog",
    summary = "Create a contact",
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Contact created", body = ContactResponse),
    )
)]
pub async fn create_contact(
    State(state): State<AppState>,
    Json(req): Json<CreateContactRequest>,
) -> impl IntoResponse {
    let contact = Contact {
        id: ContactId::new(),
        name: req.name.clone(),
        phone: req.phone.clone(),
        email: req.email.clone(),
    };
    let id = state.booking_service.catalog().insert_contact(contact).await;
    (
        StatusCode::CREATED,
        Json(ContactResponse {
            contact_id: id,
            name: req.name,
            phone: req.phone,
            email: req.email,
        }),
    )
}

/// `GET /contacts/:id` — Get a contact.
///
/// # Errors
///
/// Returns [`BookingError::ContactNotFound`] for an unknown ID.
#[utoipa::path(
    get,
    path = "/api/v1/contacts/{id}",
    tag = "Catalog",
    summary = "Get a contact",
    params(("id" = ContactId, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Contact detail", body = ContactResponse),
        (status = 404, description = "Contact not found", body = ErrorResponse),
    )
)]
pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<ContactId>,
) -> Result<impl IntoResponse, BookingError> {
    let contact = state.booking_service.catalog().contact(id).await?;
    Ok(Json(ContactResponse {
        contact_id: contact.id,
        name: contact.name,
        phone: contact.phone,
        email: contact.email,
    }))
}

/// Catalog resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/experiences", post(create_experience))
        .route("/experiences/{id}", get(get_experience))
        .route(
            "/experiences/{id}/status",
            patch(update_experience_status),
        )
        .route(
            "/experiences/{id}/slots",
            post(create_slot).get(list_availability),
        )
        .route("/routes", post(create_route))
        .route("/routes/{id}", get(get_route))
        .route("/contacts", post(create_contact))
        .route("/contacts/{id}", get(get_contact))
}
