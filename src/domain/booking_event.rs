//! Domain events reflecting booking state mutations.
//!
//! Every state change emits a [`BookingEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers and
//! optionally appended to the PostgreSQL event log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::{ContactId, DepositId, SlotId, TicketId};

/// Domain event emitted after every state mutation.
///
/// Every variant carries the owning ticket ID (the WebSocket subscription
/// key) and a server-side timestamp.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum BookingEvent {
    /// A ticket was created with an active capacity hold.
    TicketCreated {
        /// Ticket identifier.
        ticket_id: TicketId,
        /// Reserved slot.
        slot_id: SlotId,
        /// Booking customer.
        contact_id: ContactId,
        /// Seats held.
        party_size: u32,
        /// Computed total price.
        total_price: f64,
        /// Whether a deposit gates confirmation.
        deposit_required: bool,
        /// Initial status string (PENDING, or CONFIRMED when
        /// auto-confirmed).
        status: &'static str,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A ticket reached CONFIRMED.
    TicketConfirmed {
        /// Ticket identifier.
        ticket_id: TicketId,
        /// Reserved slot.
        slot_id: SlotId,
        /// Confirmation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The sweeper expired a PENDING ticket past its hold deadline.
    TicketExpired {
        /// Ticket identifier.
        ticket_id: TicketId,
        /// Slot whose capacity was returned.
        slot_id: SlotId,
        /// Seats returned to the slot.
        released: u32,
        /// Expiry timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A ticket was cancelled by explicit administrative action.
    TicketCancelled {
        /// Ticket identifier.
        ticket_id: TicketId,
        /// Slot whose capacity was returned.
        slot_id: SlotId,
        /// Seats returned to the slot.
        released: u32,
        /// Cancellation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A payment was applied to a deposit.
    PaymentRecorded {
        /// Ticket identifier.
        ticket_id: TicketId,
        /// Deposit identifier.
        deposit_id: DepositId,
        /// Amount of this payment.
        amount: f64,
        /// Cumulative amount paid.
        amount_paid: f64,
        /// Deposit status string after the payment.
        status: &'static str,
        /// Payment timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A check-in token was issued for a confirmed ticket.
    QrTokenIssued {
        /// Ticket identifier.
        ticket_id: TicketId,
        /// Token expiry.
        expires_at: DateTime<Utc>,
        /// Issue timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A check-in token was consumed at the entry gate.
    QrTokenConsumed {
        /// Ticket identifier.
        ticket_id: TicketId,
        /// Consumption timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A check-in token was revoked before use.
    QrTokenRevoked {
        /// Ticket identifier.
        ticket_id: TicketId,
        /// Revocation timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl BookingEvent {
    /// Returns the ticket this event belongs to.
    #[must_use]
    pub const fn ticket_id(&self) -> TicketId {
        match self {
            Self::TicketCreated { ticket_id, .. }
            | Self::TicketConfirmed { ticket_id, .. }
            | Self::TicketExpired { ticket_id, .. }
            | Self::TicketCancelled { ticket_id, .. }
            | Self::PaymentRecorded { ticket_id, .. }
            | Self::QrTokenIssued { ticket_id, .. }
            | Self::QrTokenConsumed { ticket_id, .. }
            | Self::QrTokenRevoked { ticket_id, .. } => *ticket_id,
        }
    }

    /// Returns the snake_case event type discriminator.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::TicketCreated { .. } => "ticket_created",
            Self::TicketConfirmed { .. } => "ticket_confirmed",
            Self::TicketExpired { .. } => "ticket_expired",
            Self::TicketCancelled { .. } => "ticket_cancelled",
            Self::PaymentRecorded { .. } => "payment_recorded",
            Self::QrTokenIssued { .. } => "qr_token_issued",
            Self::QrTokenConsumed { .. } => "qr_token_consumed",
            Self::QrTokenRevoked { .. } => "qr_token_revoked",
        }
    }
}
