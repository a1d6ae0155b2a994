//! Check-in service: QR token issuance and gate-side verification.
//!
//! Tokens are issued only for CONFIRMED tickets and expire at the end of
//! the slot's day plus a configurable grace window, so a late group can
//! still be admitted. Verification is single-use: the first scan wins,
//! every later scan of the same token is rejected.

use std::sync::Arc;

use chrono::{Duration, NaiveTime, TimeZone, Utc};

use crate::domain::qr_token::{QrToken, QrTokenStatus};
use crate::domain::ticket::TicketStatus;
use crate::domain::{BookingEvent, BookingStore, Catalog, EventBus, TicketId, TokenVault};
use crate::error::BookingError;

/// What the gate operator sees after a successful scan.
#[derive(Debug, Clone)]
pub struct CheckinSummary {
    /// Admitted ticket.
    pub ticket_id: TicketId,
    /// Name of the booking customer.
    pub contact_name: String,
    /// Name of the booked experience.
    pub experience_name: String,
    /// Slot date.
    pub slot_date: chrono::NaiveDate,
    /// Slot start time.
    pub slot_time: NaiveTime,
    /// Number of participants to admit.
    pub party_size: u32,
    /// Ticket state at scan time (always CONFIRMED).
    pub ticket_status: TicketStatus,
}

/// Issues and verifies single-use check-in tokens.
#[derive(Debug, Clone)]
pub struct CheckinService {
    store: Arc<BookingStore>,
    vault: Arc<TokenVault>,
    catalog: Arc<Catalog>,
    event_bus: EventBus,
    /// Hours past the end of the slot's day during which a token still
    /// admits.
    qr_grace_hours: i64,
}

impl CheckinService {
    /// Creates a new `CheckinService`.
    #[must_use]
    pub fn new(
        store: Arc<BookingStore>,
        vault: Arc<TokenVault>,
        catalog: Arc<Catalog>,
        event_bus: EventBus,
        qr_grace_hours: i64,
    ) -> Self {
        Self {
            store,
            vault,
            catalog,
            event_bus,
            qr_grace_hours,
        }
    }

    /// Issues a fresh token for a CONFIRMED ticket, revoking any prior
    /// live token for the same ticket.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::TicketNotFound`] for an unknown ticket and
    /// [`BookingError::Conflict`] when the ticket is not CONFIRMED.
    pub async fn generate(&self, ticket_id: TicketId) -> Result<QrToken, BookingError> {
        let ticket_lock = self.store.ticket(ticket_id).await?;
        let (status, slot_id) = {
            let ticket = ticket_lock.read().await;
            (ticket.status, ticket.slot_id)
        };
        if status != TicketStatus::Confirmed {
            return Err(BookingError::Conflict(format!(
                "ticket {ticket_id} is {}, tokens are issued for CONFIRMED tickets only",
                status.as_str()
            )));
        }

        let slot = self.catalog.slot(slot_id).await?;
        // Valid until the end of the slot's day plus the grace window.
        let end_of_day = slot
            .date
            .and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default());
        let expires_at =
            Utc.from_utc_datetime(&end_of_day) + Duration::hours(self.qr_grace_hours);

        let token = self.vault.issue(ticket_id, expires_at).await;
        let _ = self.event_bus.publish(BookingEvent::QrTokenIssued {
            ticket_id,
            expires_at,
            timestamp: Utc::now(),
        });
        tracing::info!(%ticket_id, %expires_at, "check-in token issued");
        Ok(token)
    }

    /// Verifies a scanned token and consumes it.
    ///
    /// The status check and the transition to USED happen under the
    /// per-token mutex, so of two concurrent scans exactly one succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::TokenNotFound`] for an unknown token,
    /// [`BookingError::TokenAlreadyUsed`] / [`BookingError::TokenRevoked`]
    /// for a consumed or invalidated one, [`BookingError::TokenExpired`]
    /// past the validity window, and [`BookingError::Conflict`] when the
    /// ticket is no longer CONFIRMED.
    pub async fn verify(&self, token: &str) -> Result<CheckinSummary, BookingError> {
        let entry = self.vault.entry(token).await?;
        let mut token = entry.lock().await;

        match token.status {
            QrTokenStatus::Active => {}
            QrTokenStatus::Used => return Err(BookingError::TokenAlreadyUsed),
            QrTokenStatus::Revoked => return Err(BookingError::TokenRevoked),
        }
        let now = Utc::now();
        if now > token.expires_at {
            return Err(BookingError::TokenExpired);
        }

        let ticket_id = token.ticket_id;
        let ticket_lock = self.store.ticket(ticket_id).await?;
        let ticket = ticket_lock.read().await;
        if ticket.status != TicketStatus::Confirmed {
            return Err(BookingError::Conflict(format!(
                "ticket {ticket_id} is {}, only CONFIRMED tickets admit",
                ticket.status.as_str()
            )));
        }

        let contact = self.catalog.contact(ticket.contact_id).await?;
        let experience = self.catalog.experience(ticket.experience_id).await?;
        let slot = self.catalog.slot(ticket.slot_id).await?;
        let summary = CheckinSummary {
            ticket_id,
            contact_name: contact.name,
            experience_name: experience.name,
            slot_date: slot.date,
            slot_time: slot.time,
            party_size: ticket.party_size,
            ticket_status: ticket.status,
        };
        drop(ticket);

        token.status = QrTokenStatus::Used;
        drop(token);

        let _ = self.event_bus.publish(BookingEvent::QrTokenConsumed {
            ticket_id,
            timestamp: now,
        });
        tracing::info!(%ticket_id, party_size = summary.party_size, "check-in accepted");
        Ok(summary)
    }

    /// Revokes the live token of a ticket, if one exists.
    ///
    /// Returns `true` when an ACTIVE token was invalidated. A ticket
    /// without a token is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::TicketNotFound`] for an unknown ticket and
    /// [`BookingError::Conflict`] when the token has already admitted.
    pub async fn revoke(&self, ticket_id: TicketId) -> Result<bool, BookingError> {
        let _ = self.store.ticket(ticket_id).await?;
        if let Some(current) = self.vault.token_for(ticket_id).await
            && current.status == QrTokenStatus::Used
        {
            return Err(BookingError::Conflict(format!(
                "check-in token for ticket {ticket_id} has already been used"
            )));
        }
        let revoked = self.vault.revoke_for(ticket_id).await;
        if revoked {
            let _ = self.event_bus.publish(BookingEvent::QrTokenRevoked {
                ticket_id,
                timestamp: Utc::now(),
            });
            tracing::info!(%ticket_id, "check-in token revoked");
        }
        Ok(revoked)
    }

    /// Returns the current token of a ticket, if one has been issued.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::TicketNotFound`] for an unknown ticket.
    pub async fn token_status(&self, ticket_id: TicketId) -> Result<Option<QrToken>, BookingError> {
        let _ = self.store.ticket(ticket_id).await?;
        Ok(self.vault.token_for(ticket_id).await)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::catalog::{
        Contact, DepositPolicy, Experience, ExperienceSlot, ExperienceStatus,
    };
    use crate::domain::ticket::Ticket;
    use crate::domain::{CapacityLedger, ContactId, ExperienceId, SlotId};
    use chrono::Days;

    struct Fixture {
        service: CheckinService,
        store: Arc<BookingStore>,
        vault: Arc<TokenVault>,
        ticket_id: TicketId,
    }

    async fn fixture(status: TicketStatus) -> Fixture {
        let catalog = Arc::new(Catalog::new());
        let store = Arc::new(BookingStore::new());
        let ledger = CapacityLedger::new();

        let contact_id = catalog
            .insert_contact(Contact {
                id: ContactId::new(),
                name: "Ada".to_string(),
                phone: None,
                email: None,
            })
            .await;
        let Ok(experience_id) = catalog
            .insert_experience(Experience {
                id: ExperienceId::new(),
                name: "Canyoning".to_string(),
                individual_price: 100.0,
                route_price: None,
                deposit_policy: DepositPolicy::None,
                deposit_ttl_hours: None,
                status: ExperienceStatus::Online,
            })
            .await
        else {
            panic!("experience insert failed");
        };
        let date = Utc::now()
            .date_naive()
            .checked_add_days(Days::new(7))
            .unwrap_or_default();
        let Ok(slot_id) = catalog
            .insert_slot(ExperienceSlot {
                id: SlotId::new(),
                experience_id,
                date,
                time: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
                max_capacity: 10,
            })
            .await
        else {
            panic!("slot insert failed");
        };
        let Ok(()) = ledger.register_slot(slot_id, 10).await else {
            panic!("slot registration failed");
        };
        let Ok(reservation) = ledger.reserve(slot_id, 3).await else {
            panic!("reserve failed");
        };

        let now = Utc::now();
        let Ok(ticket_id) = store
            .insert_ticket(Ticket {
                id: TicketId::new(),
                contact_id,
                experience_id,
                route_id: None,
                slot_id,
                party_size: 3,
                total_price: 300.0,
                deposit_required: false,
                deposit_amount: 0.0,
                status,
                reservation,
                created_at: now,
                expires_at: now + Duration::hours(24),
            })
            .await
        else {
            panic!("ticket insert failed");
        };

        let vault = Arc::new(TokenVault::new());
        let service = CheckinService::new(
            Arc::clone(&store),
            Arc::clone(&vault),
            catalog,
            EventBus::new(100),
            6,
        );
        Fixture {
            service,
            store,
            vault,
            ticket_id,
        }
    }

    #[tokio::test]
    async fn generate_then_verify_admits_once() {
        let f = fixture(TicketStatus::Confirmed).await;
        let Ok(token) = f.service.generate(f.ticket_id).await else {
            panic!("generate failed");
        };

        let Ok(summary) = f.service.verify(&token.token).await else {
            panic!("verify failed");
        };
        assert_eq!(summary.ticket_id, f.ticket_id);
        assert_eq!(summary.contact_name, "Ada");
        assert_eq!(summary.party_size, 3);

        let second = f.service.verify(&token.token).await;
        assert!(matches!(second, Err(BookingError::TokenAlreadyUsed)));
    }

    #[tokio::test]
    async fn pending_ticket_gets_no_token() {
        let f = fixture(TicketStatus::Pending).await;
        let result = f.service.generate(f.ticket_id).await;
        assert!(matches!(result, Err(BookingError::Conflict(_))));
    }

    #[tokio::test]
    async fn unknown_token_rejected() {
        let f = fixture(TicketStatus::Confirmed).await;
        let result = f.service.verify("doesnotexist").await;
        assert!(matches!(result, Err(BookingError::TokenNotFound)));
    }

    #[tokio::test]
    async fn expired_token_rejected_but_not_consumed() {
        let f = fixture(TicketStatus::Confirmed).await;
        let token = f
            .vault
            .issue(f.ticket_id, Utc::now() - Duration::hours(1))
            .await;

        let result = f.service.verify(&token.token).await;
        assert!(matches!(result, Err(BookingError::TokenExpired)));

        // Expiry is a read-only rejection: the token stays ACTIVE.
        let Ok(entry) = f.vault.entry(&token.token).await else {
            panic!("token vanished");
        };
        assert_eq!(entry.lock().await.status, QrTokenStatus::Active);
    }

    #[tokio::test]
    async fn revoked_token_rejected() {
        let f = fixture(TicketStatus::Confirmed).await;
        let Ok(token) = f.service.generate(f.ticket_id).await else {
            panic!("generate failed");
        };
        let Ok(revoked) = f.service.revoke(f.ticket_id).await else {
            panic!("revoke failed");
        };
        assert!(revoked);

        let result = f.service.verify(&token.token).await;
        assert!(matches!(result, Err(BookingError::TokenRevoked)));
    }

    #[tokio::test]
    async fn cancelled_ticket_token_rejected() {
        let f = fixture(TicketStatus::Confirmed).await;
        let Ok(token) = f.service.generate(f.ticket_id).await else {
            panic!("generate failed");
        };

        // Ticket cancelled after issuance; the token alone must not admit.
        let Ok(ticket_lock) = f.store.ticket(f.ticket_id).await else {
            panic!("ticket lookup failed");
        };
        ticket_lock.write().await.status = TicketStatus::Cancelled;

        let result = f.service.verify(&token.token).await;
        assert!(matches!(result, Err(BookingError::Conflict(_))));
    }

    #[tokio::test]
    async fn revoke_after_use_conflicts() {
        let f = fixture(TicketStatus::Confirmed).await;
        let Ok(token) = f.service.generate(f.ticket_id).await else {
            panic!("generate failed");
        };
        let Ok(_) = f.service.verify(&token.token).await else {
            panic!("verify failed");
        };

        let result = f.service.revoke(f.ticket_id).await;
        assert!(matches!(result, Err(BookingError::Conflict(_))));
    }

    #[tokio::test]
    async fn reissue_invalidates_prior_token() {
        let f = fixture(TicketStatus::Confirmed).await;
        let Ok(first) = f.service.generate(f.ticket_id).await else {
            panic!("generate failed");
        };
        let Ok(second) = f.service.generate(f.ticket_id).await else {
            panic!("generate failed");
        };

        let stale = f.service.verify(&first.token).await;
        assert!(matches!(stale, Err(BookingError::TokenRevoked)));
        assert!(f.service.verify(&second.token).await.is_ok());
    }

    #[tokio::test]
    async fn concurrent_scans_admit_exactly_once() {
        let f = fixture(TicketStatus::Confirmed).await;
        let Ok(token) = f.service.generate(f.ticket_id).await else {
            panic!("generate failed");
        };

        let mut handles = Vec::new();
        for _ in 0..4 {
            let service = f.service.clone();
            let value = token.token.clone();
            handles.push(tokio::spawn(
                async move { service.verify(&value).await },
            ));
        }
        let mut admitted = 0;
        for handle in handles {
            let Ok(result) = handle.await else {
                panic!("scan task panicked");
            };
            if result.is_ok() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }

    #[tokio::test]
    async fn token_status_reports_current_token() {
        let f = fixture(TicketStatus::Confirmed).await;
        let Ok(none_yet) = f.service.token_status(f.ticket_id).await else {
            panic!("status failed");
        };
        assert!(none_yet.is_none());

        let Ok(issued) = f.service.generate(f.ticket_id).await else {
            panic!("generate failed");
        };
        let Ok(current) = f.service.token_status(f.ticket_id).await else {
            panic!("status failed");
        };
        assert_eq!(current.map(|t| t.token), Some(issued.token));
    }
}
