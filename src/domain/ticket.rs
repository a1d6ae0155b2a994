//! Ticket entity and its state machine.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::capacity::ReservationHandle;
use super::ids::{ContactId, ExperienceId, RouteId, SlotId, TicketId};

/// Lifecycle state of a ticket.
///
/// ```text
/// PENDING ──────► CONFIRMED ──► CANCELLED
///    │                │
///    ├──► EXPIRED     └ (terminal-success otherwise)
///    └──► CANCELLED
/// ```
///
/// No transition re-enters PENDING; EXPIRED and CANCELLED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    /// Capacity reserved, awaiting deposit confirmation.
    Pending,
    /// Hold confirmed; the seat is kept until the slot or a cancellation.
    Confirmed,
    /// Hold lapsed without confirmation; capacity released (automatic).
    Expired,
    /// Administratively cancelled; capacity released (manual).
    Cancelled,
}

impl TicketStatus {
    /// Returns `true` for states that admit no further transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Expired | Self::Cancelled)
    }

    /// Returns `true` if the state machine permits `self → to`.
    #[must_use]
    pub const fn can_transition(&self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Confirmed | Self::Expired | Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled)
        )
    }

    /// Status string as exposed on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Expired => "EXPIRED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// The central transactional entity: one booking of one slot.
///
/// Owns exactly one capacity reservation of size `party_size` for as long
/// as it is PENDING or CONFIRMED; the reservation is released exactly once
/// on the transition to EXPIRED or CANCELLED.
#[derive(Debug, Clone)]
pub struct Ticket {
    /// Unique identifier.
    pub id: TicketId,
    /// Booking customer.
    pub contact_id: ContactId,
    /// Booked experience.
    pub experience_id: ExperienceId,
    /// Route this booking was priced under, if any.
    pub route_id: Option<RouteId>,
    /// Reserved slot.
    pub slot_id: SlotId,
    /// Number of participants; equals the reservation quantity.
    pub party_size: u32,
    /// Computed total price at booking time.
    pub total_price: f64,
    /// Whether a deposit is needed to confirm.
    pub deposit_required: bool,
    /// Deposit amount derived from the policy (0 when not required).
    pub deposit_amount: f64,
    /// Current lifecycle state.
    pub status: TicketStatus,
    /// Capacity hold owned by this ticket.
    pub reservation: ReservationHandle,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Hold deadline; the sweeper expires PENDING tickets past this.
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_reach_all_outcomes() {
        assert!(TicketStatus::Pending.can_transition(TicketStatus::Confirmed));
        assert!(TicketStatus::Pending.can_transition(TicketStatus::Expired));
        assert!(TicketStatus::Pending.can_transition(TicketStatus::Cancelled));
    }

    #[test]
    fn confirmed_only_cancels() {
        assert!(TicketStatus::Confirmed.can_transition(TicketStatus::Cancelled));
        assert!(!TicketStatus::Confirmed.can_transition(TicketStatus::Expired));
        assert!(!TicketStatus::Confirmed.can_transition(TicketStatus::Pending));
    }

    #[test]
    fn terminal_states_absorb() {
        for terminal in [TicketStatus::Expired, TicketStatus::Cancelled] {
            assert!(terminal.is_terminal());
            for to in [
                TicketStatus::Pending,
                TicketStatus::Confirmed,
                TicketStatus::Expired,
                TicketStatus::Cancelled,
            ] {
                assert!(!terminal.can_transition(to));
            }
        }
    }

    #[test]
    fn nothing_reenters_pending() {
        for from in [
            TicketStatus::Pending,
            TicketStatus::Confirmed,
            TicketStatus::Expired,
            TicketStatus::Cancelled,
        ] {
            assert!(!from.can_transition(TicketStatus::Pending));
        }
    }
}
