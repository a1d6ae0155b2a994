//! Booking error types with HTTP status code mapping.
//!
//! [`BookingError`] is the central error type for the engine. Each variant
//! carries a taxonomy reason string, a numeric code, and maps to a specific
//! HTTP status and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "reason": "CAPACITY_EXCEEDED",
///     "message": "slot ... has 5 seats available, requested 10",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code, taxonomy reason, and message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`BookingError`]).
    pub code: u32,
    /// Taxonomy reason string (e.g. `"CAPACITY_EXCEEDED"`).
    pub reason: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                |
/// |-----------|-------------------|----------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request            |
/// | 2000–2099 | Not Found         | 404 Not Found              |
/// | 2100–2199 | State Conflict    | 409 Conflict               |
/// | 3000–3999 | Server            | 500 Internal Server Error  |
/// | 4000–4099 | Capacity          | 422 Unprocessable Entity   |
/// | 4100–4199 | Check-in          | 404 / 409 / 410            |
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Request validation failed before any mutation.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Contact with the given ID was not found.
    #[error("contact not found: {0}")]
    ContactNotFound(uuid::Uuid),

    /// Experience with the given ID was not found.
    #[error("experience not found: {0}")]
    ExperienceNotFound(uuid::Uuid),

    /// Slot with the given ID was not found.
    #[error("slot not found: {0}")]
    SlotNotFound(uuid::Uuid),

    /// Route with the given ID was not found.
    #[error("route not found: {0}")]
    RouteNotFound(uuid::Uuid),

    /// Ticket with the given ID was not found.
    #[error("ticket not found: {0}")]
    TicketNotFound(uuid::Uuid),

    /// Deposit with the given ID was not found.
    #[error("deposit not found: {0}")]
    DepositNotFound(uuid::Uuid),

    /// Slot reservation denied: not enough seats left.
    #[error("slot {slot_id} has {available} seats available, requested {requested}")]
    CapacityExceeded {
        /// Slot that was asked for capacity.
        slot_id: uuid::Uuid,
        /// Requested party size.
        requested: u32,
        /// Seats actually available at the time of the request.
        available: u32,
    },

    /// State-machine precondition violated (e.g. paying an EXPIRED ticket).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Check-in token is unknown.
    #[error("qr token not found")]
    TokenNotFound,

    /// Check-in token is past its expiry.
    #[error("qr token expired")]
    TokenExpired,

    /// Check-in token was already consumed.
    #[error("qr token already used")]
    TokenAlreadyUsed,

    /// Check-in token was administratively revoked.
    #[error("qr token revoked")]
    TokenRevoked,

    /// Event-log / storage layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BookingError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::ContactNotFound(_) => 2001,
            Self::ExperienceNotFound(_) => 2002,
            Self::SlotNotFound(_) => 2003,
            Self::RouteNotFound(_) => 2004,
            Self::TicketNotFound(_) => 2005,
            Self::DepositNotFound(_) => 2006,
            Self::Conflict(_) => 2101,
            Self::CapacityExceeded { .. } => 4001,
            Self::TokenNotFound => 4101,
            Self::TokenExpired => 4102,
            Self::TokenAlreadyUsed => 4103,
            Self::TokenRevoked => 4104,
            Self::Persistence(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the taxonomy reason string for this variant.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ContactNotFound(_)
            | Self::ExperienceNotFound(_)
            | Self::SlotNotFound(_)
            | Self::RouteNotFound(_)
            | Self::TicketNotFound(_)
            | Self::DepositNotFound(_) => "NOT_FOUND",
            Self::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            Self::Conflict(_) | Self::TokenRevoked => "CONFLICT",
            Self::TokenNotFound => "TOKEN_NOT_FOUND",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenAlreadyUsed => "TOKEN_ALREADY_USED",
            Self::Persistence(_) | Self::Internal(_) => "SERVER_ERROR",
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::ContactNotFound(_)
            | Self::ExperienceNotFound(_)
            | Self::SlotNotFound(_)
            | Self::RouteNotFound(_)
            | Self::TicketNotFound(_)
            | Self::DepositNotFound(_)
            | Self::TokenNotFound => StatusCode::NOT_FOUND,
            Self::CapacityExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) | Self::TokenAlreadyUsed | Self::TokenRevoked => {
                StatusCode::CONFLICT
            }
            Self::TokenExpired => StatusCode::GONE,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                reason: self.reason(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn capacity_exceeded_maps_to_422() {
        let err = BookingError::CapacityExceeded {
            slot_id: uuid::Uuid::new_v4(),
            requested: 10,
            available: 5,
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.reason(), "CAPACITY_EXCEEDED");
        assert_eq!(err.error_code(), 4001);
    }

    #[test]
    fn not_found_family_shares_reason() {
        let err = BookingError::TicketNotFound(uuid::Uuid::new_v4());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.reason(), "NOT_FOUND");
    }

    #[test]
    fn token_expired_maps_to_410() {
        assert_eq!(BookingError::TokenExpired.status_code(), StatusCode::GONE);
        assert_eq!(BookingError::TokenExpired.reason(), "TOKEN_EXPIRED");
    }

    #[test]
    fn token_already_used_maps_to_409() {
        assert_eq!(
            BookingError::TokenAlreadyUsed.status_code(),
            StatusCode::CONFLICT
        );
    }
}
