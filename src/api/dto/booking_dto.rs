//! Ticket DTOs: creation, summary, cancellation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ticket::TicketStatus;
use crate::domain::{ContactId, DepositId, ExperienceId, RouteId, SlotId, TicketId};
use crate::service::TicketSnapshot;

/// Request body for `POST /tickets`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTicketRequest {
    /// Booking customer.
    pub contact_id: ContactId,
    /// Experience to book.
    pub experience_id: ExperienceId,
    /// Slot to reserve.
    pub slot_id: SlotId,
    /// Number of participants (≥ 1).
    pub party_size: u32,
    /// Price under this route's combined pricing instead of the
    /// experience's individual price.
    #[serde(default)]
    pub route_id: Option<RouteId>,
}

/// Ticket detail for create, get, and cancel responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct TicketResponse {
    /// Ticket identifier.
    pub ticket_id: TicketId,
    /// Booking customer.
    pub contact_id: ContactId,
    /// Booked experience.
    pub experience_id: ExperienceId,
    /// Route used for pricing, if any.
    pub route_id: Option<RouteId>,
    /// Reserved slot.
    pub slot_id: SlotId,
    /// Seats held.
    pub party_size: u32,
    /// Computed total price.
    pub total_price: f64,
    /// Whether a deposit gates confirmation.
    pub deposit_required: bool,
    /// Required deposit amount.
    pub deposit_amount: f64,
    /// Deposit record to pay against, when one exists.
    pub deposit_id: Option<DepositId>,
    /// PENDING, CONFIRMED, EXPIRED, or CANCELLED.
    pub status: TicketStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Hold deadline.
    pub expires_at: DateTime<Utc>,
}

impl From<TicketSnapshot> for TicketResponse {
    fn from(s: TicketSnapshot) -> Self {
        Self {
            ticket_id: s.ticket_id,
            contact_id: s.contact_id,
            experience_id: s.experience_id,
            route_id: s.route_id,
            slot_id: s.slot_id,
            party_size: s.party_size,
            total_price: s.total_price,
            deposit_required: s.deposit_required,
            deposit_amount: s.deposit_amount,
            deposit_id: s.deposit_id,
            status: s.status,
            created_at: s.created_at,
            expires_at: s.expires_at,
        }
    }
}
