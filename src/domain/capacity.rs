//! Per-slot capacity ledger with atomic reserve/release.
//!
//! [`CapacityLedger`] is a pure capacity accountant keyed by slot
//! identity. It knows nothing about tickets; the booking service holds a
//! [`ReservationHandle`] for each active hold and returns it here when
//! the hold ends.
//!
//! # Concurrency
//!
//! The outer map is behind a `RwLock`; each slot's counters sit behind
//! their own `Mutex`, held for the whole check-and-increment. Two
//! concurrent `reserve` calls on the same slot serialize on that mutex,
//! so the sum of outstanding holds can never exceed `max_capacity`.
//! Reservations on different slots proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use super::ids::{ReservationId, SlotId};
use crate::error::BookingError;

/// Proof of a granted capacity hold.
///
/// Carries everything `release` needs, so the ledger never has to be
/// consulted to find out what a handle meant. Handles are copyable;
/// releasing the same handle twice is a defined no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationHandle {
    /// Unique identity of this hold.
    pub id: ReservationId,
    /// Slot the hold was granted against.
    pub slot_id: SlotId,
    /// Number of seats held.
    pub quantity: u32,
}

/// Counters for a single slot. Guarded by the per-slot mutex.
#[derive(Debug)]
struct SlotLedger {
    max_capacity: u32,
    reserved: u32,
    /// Outstanding holds by reservation ID. A release only decrements
    /// `reserved` if the ID is still present, which makes retries safe.
    outstanding: HashMap<ReservationId, u32>,
}

/// Capacity ledger for all registered slots.
#[derive(Debug, Default)]
pub struct CapacityLedger {
    slots: RwLock<HashMap<SlotId, Arc<Mutex<SlotLedger>>>>,
}

impl CapacityLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a ledger entry for a newly created slot.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] if the slot is already
    /// registered.
    pub async fn register_slot(
        &self,
        slot_id: SlotId,
        max_capacity: u32,
    ) -> Result<(), BookingError> {
        let mut map = self.slots.write().await;
        if map.contains_key(&slot_id) {
            return Err(BookingError::Validation(format!(
                "slot {slot_id} already registered"
            )));
        }
        map.insert(
            slot_id,
            Arc::new(Mutex::new(SlotLedger {
                max_capacity,
                reserved: 0,
                outstanding: HashMap::new(),
            })),
        );
        Ok(())
    }

    /// Atomically reserves `quantity` seats against a slot.
    ///
    /// Fails fast without mutating state when fewer than `quantity` seats
    /// are available; there is no queueing for capacity.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::SlotNotFound`] for an unregistered slot and
    /// [`BookingError::CapacityExceeded`] when the slot is too full.
    pub async fn reserve(
        &self,
        slot_id: SlotId,
        quantity: u32,
    ) -> Result<ReservationHandle, BookingError> {
        let entry = self.entry(slot_id).await?;
        let mut ledger = entry.lock().await;

        let available = ledger.max_capacity - ledger.reserved;
        if quantity > available {
            return Err(BookingError::CapacityExceeded {
                slot_id: *slot_id.as_uuid(),
                requested: quantity,
                available,
            });
        }

        let handle = ReservationHandle {
            id: ReservationId::new(),
            slot_id,
            quantity,
        };
        ledger.reserved += quantity;
        ledger.outstanding.insert(handle.id, quantity);
        Ok(handle)
    }

    /// Releases a previously granted hold.
    ///
    /// Idempotent: returns `true` if the hold was outstanding and is now
    /// released, `false` if it had already been released (no-op). A
    /// handle for an unregistered slot is also a no-op, so retries from
    /// the sweeper never error.
    pub async fn release(&self, handle: &ReservationHandle) -> bool {
        let Ok(entry) = self.entry(handle.slot_id).await else {
            return false;
        };
        let mut ledger = entry.lock().await;
        match ledger.outstanding.remove(&handle.id) {
            Some(quantity) => {
                ledger.reserved = ledger.reserved.saturating_sub(quantity);
                true
            }
            None => false,
        }
    }

    /// Returns the number of currently reserved seats for a slot.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::SlotNotFound`] for an unregistered slot.
    pub async fn reserved(&self, slot_id: SlotId) -> Result<u32, BookingError> {
        let entry = self.entry(slot_id).await?;
        let ledger = entry.lock().await;
        Ok(ledger.reserved)
    }

    /// Returns the number of seats still available for a slot.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::SlotNotFound`] for an unregistered slot.
    pub async fn available(&self, slot_id: SlotId) -> Result<u32, BookingError> {
        let entry = self.entry(slot_id).await?;
        let ledger = entry.lock().await;
        Ok(ledger.max_capacity - ledger.reserved)
    }

    async fn entry(&self, slot_id: SlotId) -> Result<Arc<Mutex<SlotLedger>>, BookingError> {
        let map = self.slots.read().await;
        map.get(&slot_id)
            .cloned()
            .ok_or(BookingError::SlotNotFound(*slot_id.as_uuid()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    async fn ledger_with_slot(max: u32) -> (CapacityLedger, SlotId) {
        let ledger = CapacityLedger::new();
        let slot_id = SlotId::new();
        let Ok(()) = ledger.register_slot(slot_id, max).await else {
            panic!("register failed");
        };
        (ledger, slot_id)
    }

    #[tokio::test]
    async fn reserve_within_capacity_succeeds() {
        let (ledger, slot_id) = ledger_with_slot(20).await;
        let result = ledger.reserve(slot_id, 10).await;
        assert!(result.is_ok());
        assert_eq!(ledger.reserved(slot_id).await.ok(), Some(10));
        assert_eq!(ledger.available(slot_id).await.ok(), Some(10));
    }

    #[tokio::test]
    async fn reserve_beyond_capacity_fails_without_mutation() {
        let (ledger, slot_id) = ledger_with_slot(8).await;
        let Ok(_first) = ledger.reserve(slot_id, 5).await else {
            panic!("first reserve failed");
        };

        let second = ledger.reserve(slot_id, 4).await;
        assert!(matches!(
            second,
            Err(BookingError::CapacityExceeded {
                requested: 4,
                available: 3,
                ..
            })
        ));
        // Failed reserve must leave the counters untouched.
        assert_eq!(ledger.reserved(slot_id).await.ok(), Some(5));
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let (ledger, slot_id) = ledger_with_slot(20).await;
        let Ok(handle) = ledger.reserve(slot_id, 6).await else {
            panic!("reserve failed");
        };

        assert!(ledger.release(&handle).await);
        assert_eq!(ledger.reserved(slot_id).await.ok(), Some(0));

        // Second release of the same handle is a no-op, not an error.
        assert!(!ledger.release(&handle).await);
        assert_eq!(ledger.reserved(slot_id).await.ok(), Some(0));
    }

    #[tokio::test]
    async fn sequential_scenario_matches_counts() {
        // max 20, reserved 5; party of 10 fits, a second party of 10 does not.
        let (ledger, slot_id) = ledger_with_slot(20).await;
        let Ok(_seed) = ledger.reserve(slot_id, 5).await else {
            panic!("seed reserve failed");
        };

        let first = ledger.reserve(slot_id, 10).await;
        assert!(first.is_ok());
        assert_eq!(ledger.reserved(slot_id).await.ok(), Some(15));

        let second = ledger.reserve(slot_id, 10).await;
        assert!(matches!(
            second,
            Err(BookingError::CapacityExceeded { available: 5, .. })
        ));
        assert_eq!(ledger.reserved(slot_id).await.ok(), Some(15));
    }

    #[tokio::test]
    async fn concurrent_reserves_never_oversell() {
        let (ledger, slot_id) = ledger_with_slot(10).await;
        let ledger = Arc::new(ledger);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                ledger.reserve(slot_id, 3).await.is_ok()
            }));
        }

        let mut granted = 0u32;
        for task in handles {
            let Ok(ok) = task.await else {
                panic!("task panicked");
            };
            if ok {
                granted += 1;
            }
        }

        // 8 × 3 = 24 requested against 10 seats: exactly 3 grants fit.
        assert_eq!(granted, 3);
        assert_eq!(ledger.reserved(slot_id).await.ok(), Some(9));
    }

    #[tokio::test]
    async fn unregistered_slot_is_not_found() {
        let ledger = CapacityLedger::new();
        let result = ledger.reserve(SlotId::new(), 1).await;
        assert!(matches!(result, Err(BookingError::SlotNotFound(_))));
    }

    #[tokio::test]
    async fn duplicate_registration_rejected() {
        let (ledger, slot_id) = ledger_with_slot(5).await;
        assert!(ledger.register_slot(slot_id, 5).await.is_err());
    }
}
