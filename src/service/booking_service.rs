//! Booking service: the ticket state machine and its orchestration.
//!
//! Composes the catalog, the capacity ledger, pricing, and the deposit
//! calculator into the operations of the booking engine. Every mutation
//! method follows the pattern: validate → reserve/lock → mutate → emit
//! events → return snapshot. Capacity reservation and ticket creation
//! form one logical transaction: any failure after a successful reserve
//! triggers a compensating release before the error is surfaced.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::domain::catalog::{Experience, ExperienceSlot};
use crate::domain::deposit::{compute_deposit, Deposit, DepositStatus};
use crate::domain::ticket::{Ticket, TicketStatus};
use crate::domain::{
    BookingEvent, BookingStore, CapacityLedger, Catalog, ContactId, DepositId, EventBus,
    ExperienceId, RouteId, SlotId, TicketId, TokenVault,
};
use crate::domain::pricing;
use crate::error::BookingError;

/// Hold-window policy applied at ticket creation.
#[derive(Debug, Clone, Copy)]
pub struct HoldPolicy {
    /// Hold window in hours when the experience defines no deposit TTL.
    pub default_hold_hours: i64,
    /// Whether no-deposit tickets confirm immediately on creation.
    pub auto_confirm_without_deposit: bool,
}

impl Default for HoldPolicy {
    fn default() -> Self {
        Self {
            default_hold_hours: 24,
            auto_confirm_without_deposit: true,
        }
    }
}

/// Parameters for creating a ticket.
#[derive(Debug, Clone, Copy)]
pub struct NewTicket {
    /// Booking customer.
    pub contact_id: ContactId,
    /// Experience to book.
    pub experience_id: ExperienceId,
    /// Slot to reserve.
    pub slot_id: SlotId,
    /// Number of participants.
    pub party_size: u32,
    /// Price the booking under this route's combined pricing.
    pub route_id: Option<RouteId>,
}

/// Read-only view of a ticket returned by service operations.
#[derive(Debug, Clone)]
pub struct TicketSnapshot {
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
    /// Deposit amount derived from the policy.
    pub deposit_amount: f64,
    /// Deposit record, when one exists.
    pub deposit_id: Option<DepositId>,
    /// Current lifecycle state.
    pub status: TicketStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Hold deadline.
    pub expires_at: DateTime<Utc>,
}

/// Read-only view of a deposit returned by service operations.
#[derive(Debug, Clone)]
pub struct DepositSnapshot {
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
    /// Payment progress.
    pub status: DepositStatus,
    /// Payment deadline.
    pub due_at: DateTime<Utc>,
    /// When the deposit completed.
    pub paid_at: Option<DateTime<Utc>>,
}

/// Availability of a single slot as exposed by the availability query.
#[derive(Debug, Clone)]
pub struct SlotAvailability {
    /// The slot record.
    pub slot: ExperienceSlot,
    /// Seats still available right now.
    pub available_capacity: u32,
}

/// Orchestration layer for all booking operations.
#[derive(Debug, Clone)]
pub struct BookingService {
    catalog: Arc<Catalog>,
    ledger: Arc<CapacityLedger>,
    store: Arc<BookingStore>,
    vault: Arc<TokenVault>,
    event_bus: EventBus,
    hold: HoldPolicy,
}

impl BookingService {
    /// Creates a new `BookingService`.
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        ledger: Arc<CapacityLedger>,
        store: Arc<BookingStore>,
        vault: Arc<TokenVault>,
        event_bus: EventBus,
        hold: HoldPolicy,
    ) -> Self {
        Self {
            catalog,
            ledger,
            store,
            vault,
            event_bus,
            hold,
        }
    }

    /// Returns a reference to the catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Returns a reference to the capacity ledger.
    #[must_use]
    pub fn ledger(&self) -> &Arc<CapacityLedger> {
        &self.ledger
    }

    /// Returns a reference to the booking store.
    #[must_use]
    pub fn store(&self) -> &Arc<BookingStore> {
        &self.store
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Creates a slot in the catalog and seeds its capacity ledger entry.
    ///
    /// # Errors
    ///
    /// Returns a [`BookingError`] if the owning experience does not exist
    /// or the capacity is invalid.
    pub async fn create_slot(&self, slot: ExperienceSlot) -> Result<SlotId, BookingError> {
        let max_capacity = slot.max_capacity;
        let id = self.catalog.insert_slot(slot).await?;
        self.ledger.register_slot(id, max_capacity).await?;
        Ok(id)
    }

    /// Creates a ticket: validates, prices, reserves capacity, derives
    /// the deposit, and persists the ticket (and deposit) atomically.
    ///
    /// The ticket starts PENDING, or directly CONFIRMED when no deposit
    /// is required and the hold policy auto-confirms.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] before any mutation for bad
    /// input, a `NotFound` variant for unknown references, and
    /// [`BookingError::CapacityExceeded`] when the slot cannot hold the
    /// party; in the latter cases nothing is created.
    pub async fn create_ticket(&self, spec: NewTicket) -> Result<TicketSnapshot, BookingError> {
        if spec.party_size == 0 {
            return Err(BookingError::Validation(
                "party_size must be at least 1".to_string(),
            ));
        }

        let _contact = self.catalog.contact(spec.contact_id).await?;
        let experience = self.catalog.experience(spec.experience_id).await?;
        if experience.status == crate::domain::catalog::ExperienceStatus::Offline {
            return Err(BookingError::Validation(format!(
                "experience {} is offline",
                spec.experience_id
            )));
        }

        let slot = self.catalog.slot(spec.slot_id).await?;
        if slot.experience_id != spec.experience_id {
            return Err(BookingError::Validation(format!(
                "slot {} does not belong to experience {}",
                spec.slot_id, spec.experience_id
            )));
        }
        let now = Utc::now();
        if slot.date.and_time(slot.time) <= now.naive_utc() {
            return Err(BookingError::Validation(
                "slot is in the past".to_string(),
            ));
        }

        let total_price = self
            .price_booking(&experience, spec.route_id, spec.party_size)
            .await?;
        let (deposit_required, deposit_amount) =
            compute_deposit(total_price, &experience.deposit_policy);

        let ttl_hours = if deposit_required {
            experience
                .deposit_ttl_hours
                .unwrap_or(self.hold.default_hold_hours)
        } else {
            self.hold.default_hold_hours
        };
        let expires_at = now + Duration::hours(ttl_hours);

        let status = if !deposit_required && self.hold.auto_confirm_without_deposit {
            TicketStatus::Confirmed
        } else {
            TicketStatus::Pending
        };

        // Point of no return: from here on every failure must release.
        let reservation = self.ledger.reserve(spec.slot_id, spec.party_size).await?;

        let ticket = Ticket {
            id: TicketId::new(),
            contact_id: spec.contact_id,
            experience_id: spec.experience_id,
            route_id: spec.route_id,
            slot_id: spec.slot_id,
            party_size: spec.party_size,
            total_price,
            deposit_required,
            deposit_amount,
            status,
            reservation,
            created_at: now,
            expires_at,
        };
        let snapshot_base = ticket.clone();

        let ticket_id = match self.store.insert_ticket(ticket).await {
            Ok(id) => id,
            Err(err) => {
                let _ = self.ledger.release(&reservation).await;
                return Err(err);
            }
        };

        let deposit_id = if deposit_required {
            let deposit = Deposit::new(ticket_id, deposit_amount, expires_at);
            match self.store.insert_deposit(deposit).await {
                Ok(id) => Some(id),
                Err(err) => {
                    self.store.remove_ticket(ticket_id).await;
                    let _ = self.ledger.release(&reservation).await;
                    return Err(err);
                }
            }
        } else {
            None
        };

        let _ = self.event_bus.publish(BookingEvent::TicketCreated {
            ticket_id,
            slot_id: spec.slot_id,
            contact_id: spec.contact_id,
            party_size: spec.party_size,
            total_price,
            deposit_required,
            status: status.as_str(),
            timestamp: now,
        });
        if status == TicketStatus::Confirmed {
            let _ = self.event_bus.publish(BookingEvent::TicketConfirmed {
                ticket_id,
                slot_id: spec.slot_id,
                timestamp: now,
            });
        }

        tracing::info!(
            %ticket_id,
            slot_id = %spec.slot_id,
            party_size = spec.party_size,
            status = status.as_str(),
            "ticket created"
        );

        Ok(TicketSnapshot {
            ticket_id,
            contact_id: snapshot_base.contact_id,
            experience_id: snapshot_base.experience_id,
            route_id: snapshot_base.route_id,
            slot_id: snapshot_base.slot_id,
            party_size: snapshot_base.party_size,
            total_price,
            deposit_required,
            deposit_amount,
            deposit_id,
            status,
            created_at: now,
            expires_at,
        })
    }

    /// Applies a payment to a deposit, confirming the owning ticket once
    /// the required amount is reached. Partial payments keep the ticket
    /// PENDING; capacity stays held either way.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] for a non-positive amount,
    /// [`BookingError::DepositNotFound`] / [`BookingError::TicketNotFound`]
    /// for unknown records, and [`BookingError::Conflict`] when the
    /// deposit is already paid or the ticket is no longer PENDING.
    pub async fn record_payment(
        &self,
        deposit_id: DepositId,
        amount: f64,
    ) -> Result<DepositSnapshot, BookingError> {
        if amount <= 0.0 {
            return Err(BookingError::Validation(
                "amount must be greater than 0".to_string(),
            ));
        }

        let deposit_lock = self.store.deposit(deposit_id).await?;
        let ticket_id = deposit_lock.read().await.ticket_id;
        let ticket_lock = self.store.ticket(ticket_id).await?;

        // Lock order is always ticket, then deposit.
        let mut ticket = ticket_lock.write().await;
        let mut deposit = deposit_lock.write().await;

        if deposit.status == DepositStatus::Paid {
            return Err(BookingError::Conflict(format!(
                "deposit {deposit_id} is already paid"
            )));
        }
        if ticket.status != TicketStatus::Pending {
            return Err(BookingError::Conflict(format!(
                "ticket {ticket_id} is {}, payments only apply to PENDING tickets",
                ticket.status.as_str()
            )));
        }

        let now = Utc::now();
        let completed = deposit.apply_payment(amount, now);
        if completed {
            ticket.status = TicketStatus::Confirmed;
        }

        let slot_id = ticket.slot_id;
        let snapshot = DepositSnapshot {
            deposit_id,
            ticket_id,
            amount_required: deposit.amount_required,
            amount_paid: deposit.amount_paid,
            amount_remaining: deposit.amount_remaining(),
            status: deposit.status,
            due_at: deposit.due_at,
            paid_at: deposit.paid_at,
        };
        let deposit_status = match deposit.status {
            DepositStatus::Pending => "PENDING",
            DepositStatus::Partial => "PARTIAL",
            DepositStatus::Paid => "PAID",
        };
        drop(deposit);
        drop(ticket);

        let _ = self.event_bus.publish(BookingEvent::PaymentRecorded {
            ticket_id,
            deposit_id,
            amount,
            amount_paid: snapshot.amount_paid,
            status: deposit_status,
            timestamp: now,
        });
        if completed {
            let _ = self.event_bus.publish(BookingEvent::TicketConfirmed {
                ticket_id,
                slot_id,
                timestamp: now,
            });
            tracing::info!(%ticket_id, %deposit_id, "deposit paid, ticket confirmed");
        }

        Ok(snapshot)
    }

    /// Expires a PENDING ticket past its hold deadline, releasing its
    /// capacity exactly once. Invoked by the sweeper.
    ///
    /// Returns `Ok(true)` when the ticket transitioned to EXPIRED, and
    /// `Ok(false)` when the call was a no-op: the ticket is not PENDING
    /// (a payment won the race) or its deadline has not passed yet.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::TicketNotFound`] for an unknown ticket.
    pub async fn expire(
        &self,
        ticket_id: TicketId,
        now: DateTime<Utc>,
    ) -> Result<bool, BookingError> {
        let ticket_lock = self.store.ticket(ticket_id).await?;
        let mut ticket = ticket_lock.write().await;

        // Precondition re-check closes the race with a concurrent payment.
        if ticket.status != TicketStatus::Pending || now < ticket.expires_at {
            return Ok(false);
        }

        let _ = self.ledger.release(&ticket.reservation).await;
        ticket.status = TicketStatus::Expired;
        let slot_id = ticket.slot_id;
        let released = ticket.party_size;
        drop(ticket);

        let _ = self.event_bus.publish(BookingEvent::TicketExpired {
            ticket_id,
            slot_id,
            released,
            timestamp: now,
        });
        tracing::info!(%ticket_id, %slot_id, released, "pending ticket expired");
        Ok(true)
    }

    /// Cancels a PENDING or CONFIRMED ticket by explicit administrative
    /// action: releases the capacity reservation and revokes any live
    /// check-in token.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::TicketNotFound`] for an unknown ticket and
    /// [`BookingError::Conflict`] when it is already terminal.
    pub async fn cancel(&self, ticket_id: TicketId) -> Result<TicketSnapshot, BookingError> {
        let ticket_lock = self.store.ticket(ticket_id).await?;
        let mut ticket = ticket_lock.write().await;

        if !ticket.status.can_transition(TicketStatus::Cancelled) {
            return Err(BookingError::Conflict(format!(
                "ticket {ticket_id} is already {}",
                ticket.status.as_str()
            )));
        }

        let _ = self.ledger.release(&ticket.reservation).await;
        ticket.status = TicketStatus::Cancelled;
        let snapshot = self.snapshot_of(&ticket, None);
        let slot_id = ticket.slot_id;
        let released = ticket.party_size;
        drop(ticket);

        // Token lock is only taken after the ticket lock is dropped.
        let revoked = self.vault.revoke_for(ticket_id).await;
        let now = Utc::now();
        if revoked {
            let _ = self.event_bus.publish(BookingEvent::QrTokenRevoked {
                ticket_id,
                timestamp: now,
            });
        }
        let _ = self.event_bus.publish(BookingEvent::TicketCancelled {
            ticket_id,
            slot_id,
            released,
            timestamp: now,
        });
        tracing::info!(%ticket_id, %slot_id, released, "ticket cancelled");

        let deposit_id = self.store.deposit_id_for(ticket_id).await;
        Ok(TicketSnapshot {
            deposit_id,
            ..snapshot
        })
    }

    /// Returns a read-only view of a ticket.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::TicketNotFound`] for an unknown ticket.
    pub async fn ticket_snapshot(&self, ticket_id: TicketId) -> Result<TicketSnapshot, BookingError> {
        let ticket_lock = self.store.ticket(ticket_id).await?;
        let ticket = ticket_lock.read().await;
        let snapshot = self.snapshot_of(&ticket, None);
        drop(ticket);
        let deposit_id = self.store.deposit_id_for(ticket_id).await;
        Ok(TicketSnapshot {
            deposit_id,
            ..snapshot
        })
    }

    /// Returns a read-only view of a deposit.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::DepositNotFound`] for an unknown deposit.
    pub async fn deposit_snapshot(
        &self,
        deposit_id: DepositId,
    ) -> Result<DepositSnapshot, BookingError> {
        let deposit_lock = self.store.deposit(deposit_id).await?;
        let deposit = deposit_lock.read().await;
        Ok(DepositSnapshot {
            deposit_id,
            ticket_id: deposit.ticket_id,
            amount_required: deposit.amount_required,
            amount_paid: deposit.amount_paid,
            amount_remaining: deposit.amount_remaining(),
            status: deposit.status,
            due_at: deposit.due_at,
            paid_at: deposit.paid_at,
        })
    }

    /// Lists the slots of an experience with their current availability.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::ExperienceNotFound`] for an unknown
    /// experience.
    pub async fn availability(
        &self,
        experience_id: ExperienceId,
        date: Option<chrono::NaiveDate>,
    ) -> Result<Vec<SlotAvailability>, BookingError> {
        let _ = self.catalog.experience(experience_id).await?;
        let slots = self.catalog.slots_for(experience_id, date).await;
        let mut out = Vec::with_capacity(slots.len());
        for slot in slots {
            let available_capacity = self.ledger.available(slot.id).await?;
            out.push(SlotAvailability {
                slot,
                available_capacity,
            });
        }
        Ok(out)
    }

    /// IDs of PENDING tickets past their hold deadline. Sweeper input.
    pub async fn pending_due(&self, now: DateTime<Utc>) -> Vec<TicketId> {
        self.store.pending_due(now).await
    }

    async fn price_booking(
        &self,
        experience: &Experience,
        route_id: Option<RouteId>,
        party_size: u32,
    ) -> Result<f64, BookingError> {
        let Some(route_id) = route_id else {
            return Ok(pricing::experience_total(experience, party_size));
        };

        let route = self.catalog.route(route_id).await?;
        if !route.experience_ids.contains(&experience.id) {
            return Err(BookingError::Validation(format!(
                "experience {} is not part of route {route_id}",
                experience.id
            )));
        }
        let mut members = Vec::with_capacity(route.experience_ids.len());
        for member_id in &route.experience_ids {
            members.push(self.catalog.experience(*member_id).await?);
        }
        Ok(pricing::route_total(&route, &members, party_size))
    }

    fn snapshot_of(&self, ticket: &Ticket, deposit_id: Option<DepositId>) -> TicketSnapshot {
        TicketSnapshot {
            ticket_id: ticket.id,
            contact_id: ticket.contact_id,
            experience_id: ticket.experience_id,
            route_id: ticket.route_id,
            slot_id: ticket.slot_id,
            party_size: ticket.party_size,
            total_price: ticket.total_price,
            deposit_required: ticket.deposit_required,
            deposit_amount: ticket.deposit_amount,
            deposit_id,
            status: ticket.status,
            created_at: ticket.created_at,
            expires_at: ticket.expires_at,
        }
    }
}
