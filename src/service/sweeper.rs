//! Background sweeper that expires overdue PENDING tickets.
//!
//! Runs on a fixed interval. Each pass collects the tickets past their
//! hold deadline and expires them one by one; a failure on one ticket is
//! logged and does not stop the pass. Correctness does not depend on the
//! interval: every expiration re-checks its preconditions under the
//! ticket lock, so a payment racing the sweep always yields a consistent
//! outcome.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use super::booking_service::BookingService;

/// Periodic task releasing capacity held by overdue PENDING tickets.
#[derive(Debug, Clone)]
pub struct ExpirationSweeper {
    booking: Arc<BookingService>,
    interval: Duration,
}

impl ExpirationSweeper {
    /// Creates a sweeper over the given booking service.
    #[must_use]
    pub fn new(booking: Arc<BookingService>, interval_secs: u64) -> Self {
        Self {
            booking,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Runs one sweep pass and returns how many tickets were expired.
    pub async fn sweep_once(&self, now: chrono::DateTime<Utc>) -> usize {
        let due = self.booking.pending_due(now).await;
        if due.is_empty() {
            return 0;
        }
        tracing::debug!(candidates = due.len(), "sweep pass starting");

        let mut expired = 0;
        for ticket_id in due {
            match self.booking.expire(ticket_id, now).await {
                Ok(true) => expired += 1,
                // Confirmed or cancelled between the scan and the lock.
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(%ticket_id, error = %err, "sweep skipped ticket");
                }
            }
        }
        if expired > 0 {
            tracing::info!(expired, "sweep pass expired overdue tickets");
        }
        expired
    }

    /// Runs the sweeper forever. Intended to be spawned as a task.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tracing::info!(interval_secs = self.interval.as_secs(), "sweeper started");
        loop {
            ticker.tick().await;
            let _ = self.sweep_once(Utc::now()).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::catalog::{
        Contact, DepositPolicy, Experience, ExperienceSlot, ExperienceStatus,
    };
    use crate::domain::{
        BookingStore, CapacityLedger, Catalog, ContactId, EventBus, ExperienceId, SlotId,
        TokenVault,
    };
    use crate::service::booking_service::{HoldPolicy, NewTicket};
    use chrono::{Days, NaiveTime};

    async fn booking_service() -> Arc<BookingService> {
        Arc::new(BookingService::new(
            Arc::new(Catalog::new()),
            Arc::new(CapacityLedger::new()),
            Arc::new(BookingStore::new()),
            Arc::new(TokenVault::new()),
            EventBus::new(100),
            HoldPolicy::default(),
        ))
    }

    async fn seed_pending_ticket(booking: &BookingService) -> (SlotId, crate::domain::TicketId) {
        let contact_id = booking
            .catalog()
            .insert_contact(Contact {
                id: ContactId::new(),
                name: "Ada".to_string(),
                phone: None,
                email: None,
            })
            .await;
        let Ok(experience_id) = booking
            .catalog()
            .insert_experience(Experience {
                id: ExperienceId::new(),
                name: "Kayak".to_string(),
                individual_price: 80.0,
                route_price: None,
                deposit_policy: DepositPolicy::Fixed { value: 25.0 },
                deposit_ttl_hours: Some(24),
                status: ExperienceStatus::Online,
            })
            .await
        else {
            panic!("experience insert failed");
        };
        let date = Utc::now()
            .date_naive()
            .checked_add_days(Days::new(14))
            .unwrap_or_default();
        let Ok(slot_id) = booking
            .create_slot(ExperienceSlot {
                id: SlotId::new(),
                experience_id,
                date,
                time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
                max_capacity: 10,
            })
            .await
        else {
            panic!("slot insert failed");
        };
        let Ok(snapshot) = booking
            .create_ticket(NewTicket {
                contact_id,
                experience_id,
                slot_id,
                party_size: 4,
                route_id: None,
            })
            .await
        else {
            panic!("create failed");
        };
        (slot_id, snapshot.ticket_id)
    }

    #[tokio::test]
    async fn sweep_expires_only_overdue_tickets() {
        let booking = booking_service().await;
        let (slot_id, _ticket_id) = seed_pending_ticket(&booking).await;
        let sweeper = ExpirationSweeper::new(Arc::clone(&booking), 60);

        // Deadline not reached: nothing happens.
        assert_eq!(sweeper.sweep_once(Utc::now()).await, 0);
        assert_eq!(booking.ledger().reserved(slot_id).await.ok(), Some(4));

        // Past the deadline: the ticket is expired and capacity returns.
        let later = Utc::now() + chrono::Duration::hours(48);
        assert_eq!(sweeper.sweep_once(later).await, 1);
        assert_eq!(booking.ledger().reserved(slot_id).await.ok(), Some(0));

        // A second pass finds nothing.
        assert_eq!(sweeper.sweep_once(later).await, 0);
    }

    #[tokio::test]
    async fn sweep_skips_paid_tickets() {
        let booking = booking_service().await;
        let (slot_id, ticket_id) = seed_pending_ticket(&booking).await;

        let Ok(snapshot) = booking.ticket_snapshot(ticket_id).await else {
            panic!("ticket lookup failed");
        };
        let Some(deposit_id) = snapshot.deposit_id else {
            panic!("deposit missing");
        };
        let Ok(_) = booking.record_payment(deposit_id, 25.0).await else {
            panic!("payment failed");
        };

        let sweeper = ExpirationSweeper::new(Arc::clone(&booking), 60);
        let later = Utc::now() + chrono::Duration::hours(48);
        assert_eq!(sweeper.sweep_once(later).await, 0);
        assert_eq!(booking.ledger().reserved(slot_id).await.ok(), Some(4));
    }
}
