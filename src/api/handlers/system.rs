//! System endpoints: health check and effective booking policy.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Effective booking policy.
#[derive(Debug, Serialize, ToSchema)]
struct BookingPolicyResponse {
    default_hold_hours: i64,
    auto_confirm_without_deposit: bool,
    sweep_interval_secs: u64,
    qr_grace_hours: i64,
}

/// `GET /config/booking` — Effective booking policy.
#[utoipa::path(
    get,
    path = "/config/booking",
    tag = "System",
    summary = "Effective booking policy",
    description = "Returns the hold, sweep, and check-in grace settings the engine is running with.",
    responses(
        (status = 200, description = "Booking policy", body = BookingPolicyResponse),
    )
)]
pub async fn booking_policy_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(BookingPolicyResponse {
        default_hold_hours: state.config.default_hold_hours,
        auto_confirm_without_deposit: state.config.auto_confirm_without_deposit,
        sweep_interval_secs: state.config.sweep_interval_secs,
        qr_grace_hours: state.config.qr_grace_hours,
    })
}

/// System routes, mounted at the root rather than under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/booking", get(booking_policy_handler))
}
