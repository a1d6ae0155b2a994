//! Concurrent ticket and deposit storage with per-entity locking.
//!
//! [`BookingStore`] keeps every ticket and deposit behind its own
//! `tokio::sync::RwLock`, so the sweeper, payment recording, and
//! check-in can work on different tickets concurrently while operations
//! on the same ticket serialize.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::deposit::Deposit;
use super::ids::{DepositId, TicketId};
use super::ticket::{Ticket, TicketStatus};
use crate::error::BookingError;

/// Central store for tickets and their deposits.
///
/// # Concurrency
///
/// - Multiple tasks may read the same ticket concurrently.
/// - Writes to different tickets are concurrent.
/// - Writes to the same ticket are serialized, which is what lets
///   `expire` and `record_payment` race safely: whichever acquires the
///   write lock first observes the still-valid precondition and wins.
#[derive(Debug, Default)]
pub struct BookingStore {
    tickets: RwLock<HashMap<TicketId, Arc<RwLock<Ticket>>>>,
    deposits: RwLock<HashMap<DepositId, Arc<RwLock<Deposit>>>>,
    deposit_by_ticket: RwLock<HashMap<TicketId, DepositId>>,
}

impl BookingStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new ticket.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Internal`] if a ticket with the same ID
    /// already exists (should never happen with UUID v4).
    pub async fn insert_ticket(&self, ticket: Ticket) -> Result<TicketId, BookingError> {
        let id = ticket.id;
        let mut map = self.tickets.write().await;
        if map.contains_key(&id) {
            return Err(BookingError::Internal(format!(
                "ticket {id} already exists"
            )));
        }
        map.insert(id, Arc::new(RwLock::new(ticket)));
        Ok(id)
    }

    /// Removes a ticket. Used only to roll back a failed creation.
    pub async fn remove_ticket(&self, id: TicketId) {
        self.tickets.write().await.remove(&id);
    }

    /// Returns the shared lock for a ticket.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::TicketNotFound`] if it does not exist.
    pub async fn ticket(&self, id: TicketId) -> Result<Arc<RwLock<Ticket>>, BookingError> {
        let map = self.tickets.read().await;
        map.get(&id)
            .cloned()
            .ok_or(BookingError::TicketNotFound(*id.as_uuid()))
    }

    /// Inserts a new deposit.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Internal`] on an ID collision.
    pub async fn insert_deposit(&self, deposit: Deposit) -> Result<DepositId, BookingError> {
        let id = deposit.id;
        let ticket_id = deposit.ticket_id;
        let mut map = self.deposits.write().await;
        if map.contains_key(&id) {
            return Err(BookingError::Internal(format!(
                "deposit {id} already exists"
            )));
        }
        map.insert(id, Arc::new(RwLock::new(deposit)));
        drop(map);
        self.deposit_by_ticket.write().await.insert(ticket_id, id);
        Ok(id)
    }

    /// Returns the deposit ID belonging to a ticket, if one exists.
    pub async fn deposit_id_for(&self, ticket_id: TicketId) -> Option<DepositId> {
        self.deposit_by_ticket.read().await.get(&ticket_id).copied()
    }

    /// Returns the shared lock for a deposit.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::DepositNotFound`] if it does not exist.
    pub async fn deposit(&self, id: DepositId) -> Result<Arc<RwLock<Deposit>>, BookingError> {
        let map = self.deposits.read().await;
        map.get(&id)
            .cloned()
            .ok_or(BookingError::DepositNotFound(*id.as_uuid()))
    }

    /// Returns the IDs of PENDING tickets whose hold deadline has passed.
    ///
    /// The sweeper re-checks the precondition under the ticket write lock
    /// before acting, so this scan may be slightly stale without harm.
    pub async fn pending_due(&self, now: DateTime<Utc>) -> Vec<TicketId> {
        let map = self.tickets.read().await;
        let mut due = Vec::new();
        for (id, entry) in map.iter() {
            let ticket = entry.read().await;
            if ticket.status == TicketStatus::Pending && ticket.expires_at <= now {
                due.push(*id);
            }
        }
        due
    }

    /// Sum of party sizes of PENDING or CONFIRMED tickets for a slot.
    ///
    /// Cross-check for the capacity ledger; used by tests and the
    /// availability endpoint's consistency invariant.
    pub async fn active_party_total(&self, slot_id: super::ids::SlotId) -> u32 {
        let map = self.tickets.read().await;
        let mut total = 0;
        for entry in map.values() {
            let ticket = entry.read().await;
            if ticket.slot_id == slot_id
                && matches!(
                    ticket.status,
                    TicketStatus::Pending | TicketStatus::Confirmed
                )
            {
                total += ticket.party_size;
            }
        }
        total
    }

    /// Number of stored tickets.
    pub async fn ticket_count(&self) -> usize {
        self.tickets.read().await.len()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::capacity::ReservationHandle;
    use crate::domain::ids::{ContactId, ExperienceId, ReservationId, SlotId};
    use chrono::Duration;

    fn make_ticket(status: TicketStatus, expires_at: DateTime<Utc>) -> Ticket {
        let slot_id = SlotId::new();
        Ticket {
            id: TicketId::new(),
            contact_id: ContactId::new(),
            experience_id: ExperienceId::new(),
            route_id: None,
            slot_id,
            party_size: 2,
            total_price: 100.0,
            deposit_required: false,
            deposit_amount: 0.0,
            status,
            reservation: ReservationHandle {
                id: ReservationId::new(),
                slot_id,
                quantity: 2,
            },
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[tokio::test]
    async fn insert_and_get_ticket() {
        let store = BookingStore::new();
        let ticket = make_ticket(TicketStatus::Pending, Utc::now());
        let id = ticket.id;

        let Ok(inserted) = store.insert_ticket(ticket).await else {
            panic!("insert failed");
        };
        assert_eq!(inserted, id);
        assert!(store.ticket(id).await.is_ok());
    }

    #[tokio::test]
    async fn get_missing_ticket_is_not_found() {
        let store = BookingStore::new();
        let result = store.ticket(TicketId::new()).await;
        assert!(matches!(result, Err(BookingError::TicketNotFound(_))));
    }

    #[tokio::test]
    async fn pending_due_selects_only_overdue_pending() {
        let store = BookingStore::new();
        let now = Utc::now();

        let overdue = make_ticket(TicketStatus::Pending, now - Duration::hours(1));
        let overdue_id = overdue.id;
        let fresh = make_ticket(TicketStatus::Pending, now + Duration::hours(1));
        let confirmed = make_ticket(TicketStatus::Confirmed, now - Duration::hours(1));

        for t in [overdue, fresh, confirmed] {
            let Ok(_) = store.insert_ticket(t).await else {
                panic!("insert failed");
            };
        }

        let due = store.pending_due(now).await;
        assert_eq!(due, vec![overdue_id]);
    }

    #[tokio::test]
    async fn active_party_total_counts_pending_and_confirmed() {
        let store = BookingStore::new();
        let mut a = make_ticket(TicketStatus::Pending, Utc::now());
        let slot_id = a.slot_id;
        a.party_size = 3;

        let mut b = make_ticket(TicketStatus::Confirmed, Utc::now());
        b.slot_id = slot_id;
        b.party_size = 4;

        let mut c = make_ticket(TicketStatus::Expired, Utc::now());
        c.slot_id = slot_id;
        c.party_size = 5;

        for t in [a, b, c] {
            let Ok(_) = store.insert_ticket(t).await else {
                panic!("insert failed");
            };
        }
        assert_eq!(store.active_party_total(slot_id).await, 7);
    }

    #[tokio::test]
    async fn remove_ticket_rolls_back_creation() {
        let store = BookingStore::new();
        let ticket = make_ticket(TicketStatus::Pending, Utc::now());
        let id = ticket.id;
        let Ok(_) = store.insert_ticket(ticket).await else {
            panic!("insert failed");
        };
        store.remove_ticket(id).await;
        assert!(store.ticket(id).await.is_err());
        assert_eq!(store.ticket_count().await, 0);
    }
}
