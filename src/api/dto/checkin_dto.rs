//! Check-in DTOs: token issuance, verification, and status.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::qr_token::QrTokenStatus;
use crate::domain::ticket::TicketStatus;
use crate::domain::TicketId;
use crate::service::CheckinSummary;

/// Response body for `POST /tickets/{id}/qr`.
#[derive(Debug, Serialize, ToSchema)]
pub struct QrTokenResponse {
    /// Owning ticket.
    pub ticket_id: TicketId,
    /// Opaque token string to encode in the QR code.
    pub token: String,
    /// Past this instant the token no longer admits.
    pub expires_at: DateTime<Utc>,
    /// ACTIVE, USED, or REVOKED.
    pub status: QrTokenStatus,
}

/// Request body for `POST /checkin`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyTokenRequest {
    /// Scanned token string.
    pub token: String,
}

/// Response body for a successful `POST /checkin`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckinResponse {
    /// Admitted ticket.
    pub ticket_id: TicketId,
    /// Name of the booking customer.
    pub contact_name: String,
    /// Name of the booked experience.
    pub experience_name: String,
    /// Slot date.
    pub slot_date: NaiveDate,
    /// Slot start time.
    pub slot_time: NaiveTime,
    /// Number of participants to admit.
    pub party_size: u32,
    /// Ticket state at scan time.
    pub ticket_status: TicketStatus,
}

impl From<CheckinSummary> for CheckinResponse {
    fn from(s: CheckinSummary) -> Self {
        Self {
            ticket_id: s.ticket_id,
            contact_name: s.contact_name,
            experience_name: s.experience_name,
            slot_date: s.slot_date,
            slot_time: s.slot_time,
            party_size: s.party_size,
            ticket_status: s.ticket_status,
        }
    }
}

/// Response body for `POST /tickets/{id}/qr/revoke`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RevokeTokenResponse {
    /// Ticket whose token was targeted.
    pub ticket_id: TicketId,
    /// Whether an ACTIVE token was invalidated.
    pub revoked: bool,
}

/// Response body for `GET /tickets/{id}/checkin`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckinStatusResponse {
    /// Queried ticket.
    pub ticket_id: TicketId,
    /// Whether a token has ever been issued for the ticket.
    pub token_issued: bool,
    /// State of the current token, if one exists.
    pub token_status: Option<QrTokenStatus>,
    /// Expiry of the current token, if one exists.
    pub token_expires_at: Option<DateTime<Utc>>,
    /// Whether the party has been admitted.
    pub checked_in: bool,
}
