//! Deposit DTOs: status reads and payment recording.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::deposit::DepositStatus;
use crate::domain::{DepositId, TicketId};
use crate::service::DepositSnapshot;

/// Request body for `POST /deposits/{id}/payments`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordPaymentRequest {
    /// Amount to apply; must be greater than 0.
    pub amount: f64,
}

/// Deposit detail for status and payment responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct DepositResponse {
    /// Deposit identifier.
    pub deposit_id: DepositId,
    /// Owning ticket.
    pub ticket_id: TicketId,
    /// Amount required to confirm the ticket.
    pub amount_required: f64,
    /// Amount paid so far.
    pub amount_paid: f64,
    /// Amount still outstanding.
    pub amount_remaining: f64,
    /// PENDING, PARTIAL, or PAID.
    pub status: DepositStatus,
    /// Payment deadline.
    pub due_at: DateTime<Utc>,
    /// When the deposit completed, if it has.
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<DepositSnapshot> for DepositResponse {
    fn from(s: DepositSnapshot) -> Self {
        Self {
            deposit_id: s.deposit_id,
            ticket_id: s.ticket_id,
            amount_required: s.amount_required,
            amount_paid: s.amount_paid,
            amount_remaining: s.amount_remaining,
            status: s.status,
            due_at: s.due_at,
            paid_at: s.paid_at,
        }
    }
}
