//! Catalog records and their in-memory store.
//!
//! The catalog holds the bookable inventory: experiences, their dated
//! slots, routes bundling experiences, and customer contacts. Records are
//! small and cloned out of the store; the only mutation allowed once a
//! record exists is flipping an experience ONLINE/OFFLINE.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;

use super::ids::{ContactId, ExperienceId, RouteId, SlotId};
use crate::error::BookingError;

/// Publication status of an experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperienceStatus {
    /// Bookable.
    Online,
    /// Hidden from booking; existing tickets are unaffected.
    Offline,
}

/// Deposit policy attached to an experience.
///
/// Determines whether a booking needs a pre-payment to confirm and how
/// the amount is derived from the total price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DepositPolicy {
    /// No deposit; tickets are eligible for auto-confirmation.
    #[default]
    None,
    /// Deposit is a percentage of the total price.
    Percentage {
        /// Percentage in the range (0, 100].
        value: f64,
    },
    /// Deposit is a fixed amount, capped at the total price.
    Fixed {
        /// Fixed amount in the catalog currency.
        value: f64,
    },
}

impl DepositPolicy {
    /// Returns `true` if this policy requires a deposit.
    #[must_use]
    pub const fn requires_deposit(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// A bookable activity with pricing and deposit terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    /// Unique identifier.
    pub id: ExperienceId,
    /// Display name.
    pub name: String,
    /// Price per participant when booked on its own.
    pub individual_price: f64,
    /// Discounted per-participant price when booked as part of a route.
    pub route_price: Option<f64>,
    /// Deposit terms for confirming a hold.
    pub deposit_policy: DepositPolicy,
    /// Hours a PENDING hold stays reserved awaiting the deposit.
    /// Falls back to the system default when unset.
    pub deposit_ttl_hours: Option<i64>,
    /// Publication status. The only mutable field once tickets exist.
    pub status: ExperienceStatus,
}

/// A dated, timed instance of an experience with finite capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceSlot {
    /// Unique identifier.
    pub id: SlotId,
    /// Owning experience.
    pub experience_id: ExperienceId,
    /// Calendar date of the slot.
    pub date: NaiveDate,
    /// Start time of the slot.
    pub time: NaiveTime,
    /// Hard capacity ceiling; reservations can never exceed it.
    pub max_capacity: u32,
}

/// How a route's total price is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PriceMode {
    /// Sum of the member experiences' prices.
    Sum,
    /// Flat route price, subject to the minimum party size.
    Flat,
}

/// An ordered bundle of experiences sold together under combined pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Unique identifier.
    pub id: RouteId,
    /// Display name.
    pub name: String,
    /// Pricing mode for the bundle.
    pub price_mode: PriceMode,
    /// Flat route price; required when `price_mode` is [`PriceMode::Flat`].
    pub price: Option<f64>,
    /// Minimum party size to qualify for the flat route price.
    pub min_party_for_flat: u32,
    /// Ordered member experiences.
    pub experience_ids: Vec<ExperienceId>,
}

/// Customer identity; many tickets may reference one contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    /// Unique identifier.
    pub id: ContactId,
    /// Full name.
    pub name: String,
    /// Phone number, if known.
    pub phone: Option<String>,
    /// Email address, if known.
    pub email: Option<String>,
}

/// In-memory catalog store.
///
/// Reads clone the record out; the outer lock is held only for the map
/// access. Slot capacity accounting lives in the
/// [`super::capacity::CapacityLedger`], not here.
#[derive(Debug, Default)]
pub struct Catalog {
    experiences: RwLock<HashMap<ExperienceId, Experience>>,
    slots: RwLock<HashMap<SlotId, ExperienceSlot>>,
    routes: RwLock<HashMap<RouteId, Route>>,
    contacts: RwLock<HashMap<ContactId, Contact>>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new experience after validating its pricing and deposit
    /// terms.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] if the price is negative or the
    /// deposit policy value is out of range.
    pub async fn insert_experience(&self, experience: Experience) -> Result<ExperienceId, BookingError> {
        if experience.individual_price < 0.0 {
            return Err(BookingError::Validation(
                "individual_price must not be negative".to_string(),
            ));
        }
        match experience.deposit_policy {
            DepositPolicy::Percentage { value } if value <= 0.0 || value > 100.0 => {
                return Err(BookingError::Validation(format!(
                    "deposit percentage must be in (0, 100], got {value}"
                )));
            }
            DepositPolicy::Fixed { value } if value <= 0.0 => {
                return Err(BookingError::Validation(
                    "fixed deposit must be greater than 0".to_string(),
                ));
            }
            _ => {}
        }
        if experience.deposit_policy.requires_deposit()
            && experience.deposit_ttl_hours.is_some_and(|h| h <= 0)
        {
            return Err(BookingError::Validation(
                "deposit_ttl_hours must be greater than 0".to_string(),
            ));
        }
        let id = experience.id;
        self.experiences.write().await.insert(id, experience);
        Ok(id)
    }

    /// Returns the experience with the given ID.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::ExperienceNotFound`] if it does not exist.
    pub async fn experience(&self, id: ExperienceId) -> Result<Experience, BookingError> {
        self.experiences
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(BookingError::ExperienceNotFound(*id.as_uuid()))
    }

    /// Sets the publication status of an experience.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::ExperienceNotFound`] if it does not exist.
    pub async fn set_experience_status(
        &self,
        id: ExperienceId,
        status: ExperienceStatus,
    ) -> Result<Experience, BookingError> {
        let mut map = self.experiences.write().await;
        let experience = map
            .get_mut(&id)
            .ok_or(BookingError::ExperienceNotFound(*id.as_uuid()))?;
        experience.status = status;
        Ok(experience.clone())
    }

    /// Inserts a new slot for an existing experience.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::ExperienceNotFound`] if the owning
    /// experience does not exist, or [`BookingError::Validation`] if
    /// `max_capacity` is zero.
    pub async fn insert_slot(&self, slot: ExperienceSlot) -> Result<SlotId, BookingError> {
        if slot.max_capacity == 0 {
            return Err(BookingError::Validation(
                "max_capacity must be greater than 0".to_string(),
            ));
        }
        if !self
            .experiences
            .read()
            .await
            .contains_key(&slot.experience_id)
        {
            return Err(BookingError::ExperienceNotFound(
                *slot.experience_id.as_uuid(),
            ));
        }
        let id = slot.id;
        self.slots.write().await.insert(id, slot);
        Ok(id)
    }

    /// Returns the slot with the given ID.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::SlotNotFound`] if it does not exist.
    pub async fn slot(&self, id: SlotId) -> Result<ExperienceSlot, BookingError> {
        self.slots
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(BookingError::SlotNotFound(*id.as_uuid()))
    }

    /// Returns the slots of an experience, optionally restricted to a
    /// date, ordered by date then time.
    pub async fn slots_for(
        &self,
        experience_id: ExperienceId,
        date: Option<NaiveDate>,
    ) -> Vec<ExperienceSlot> {
        let map = self.slots.read().await;
        let mut slots: Vec<ExperienceSlot> = map
            .values()
            .filter(|s| s.experience_id == experience_id)
            .filter(|s| date.is_none_or(|d| s.date == d))
            .cloned()
            .collect();
        slots.sort_by_key(|s| (s.date, s.time));
        slots
    }

    /// Inserts a new route after validating its pricing mode and members.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] for an empty route or a Flat
    /// route without a price, and [`BookingError::ExperienceNotFound`] for
    /// an unknown member experience.
    pub async fn insert_route(&self, route: Route) -> Result<RouteId, BookingError> {
        if route.experience_ids.is_empty() {
            return Err(BookingError::Validation(
                "route must contain at least one experience".to_string(),
            ));
        }
        if route.price_mode == PriceMode::Flat && route.price.is_none() {
            return Err(BookingError::Validation(
                "price is required when price_mode is flat".to_string(),
            ));
        }
        {
            let experiences = self.experiences.read().await;
            for member in &route.experience_ids {
                if !experiences.contains_key(member) {
                    return Err(BookingError::ExperienceNotFound(*member.as_uuid()));
                }
            }
        }
        let id = route.id;
        self.routes.write().await.insert(id, route);
        Ok(id)
    }

    /// Returns the route with the given ID.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::RouteNotFound`] if it does not exist.
    pub async fn route(&self, id: RouteId) -> Result<Route, BookingError> {
        self.routes
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(BookingError::RouteNotFound(*id.as_uuid()))
    }

    /// Inserts a new contact.
    pub async fn insert_contact(&self, contact: Contact) -> ContactId {
        let id = contact.id;
        self.contacts.write().await.insert(id, contact);
        id
    }

    /// Returns the contact with the given ID.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::ContactNotFound`] if it does not exist.
    pub async fn contact(&self, id: ContactId) -> Result<Contact, BookingError> {
        self.contacts
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(BookingError::ContactNotFound(*id.as_uuid()))
    }
}
