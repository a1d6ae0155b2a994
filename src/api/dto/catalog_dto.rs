//! Catalog DTOs: experiences, slots, routes, contacts, availability.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::catalog::{DepositPolicy, ExperienceStatus, PriceMode};
use crate::domain::{ContactId, ExperienceId, RouteId, SlotId};

/// Request body for `POST /experiences`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateExperienceRequest {
    /// Display name.
    pub name: String,
    /// Price per participant when booked on its own.
    pub individual_price: f64,
    /// Discounted per-participant price inside a route.
    #[serde(default)]
    pub route_price: Option<f64>,
    /// Deposit policy gating confirmation.
    #[serde(default)]
    pub deposit_policy: DepositPolicy,
    /// Hold window in hours for unpaid deposits.
    #[serde(default)]
    pub deposit_ttl_hours: Option<i64>,
}

/// Experience detail for create and get responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExperienceResponse {
    /// Experience identifier.
    pub experience_id: ExperienceId,
    /// Display name.
    pub name: String,
    /// Price per participant.
    pub individual_price: f64,
    /// Route-member price, if set.
    pub route_price: Option<f64>,
    /// Deposit policy.
    pub deposit_policy: DepositPolicy,
    /// Hold window in hours, if set.
    pub deposit_ttl_hours: Option<i64>,
    /// ONLINE or OFFLINE.
    pub status: ExperienceStatus,
}

/// Request body for `PATCH /experiences/{id}/status`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateExperienceStatusRequest {
    /// New publication status.
    pub status: ExperienceStatus,
}

/// Request body for `POST /experiences/{id}/slots`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSlotRequest {
    /// Calendar date.
    pub date: NaiveDate,
    /// Start time.
    pub time: NaiveTime,
    /// Hard participant ceiling.
    pub max_capacity: u32,
}

/// Slot detail for create responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct SlotResponse {
    /// Slot identifier.
    pub slot_id: SlotId,
    /// Owning experience.
    pub experience_id: ExperienceId,
    /// Calendar date.
    pub date: NaiveDate,
    /// Start time.
    pub time: NaiveTime,
    /// Hard participant ceiling.
    pub max_capacity: u32,
}

/// Query parameters for `GET /experiences/{id}/slots`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityParams {
    /// Restrict to a single date (`YYYY-MM-DD`).
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// One slot with live availability.
#[derive(Debug, Serialize, ToSchema)]
pub struct SlotAvailabilityDto {
    /// Slot identifier.
    pub slot_id: SlotId,
    /// Calendar date.
    pub date: NaiveDate,
    /// Start time.
    pub time: NaiveTime,
    /// Hard participant ceiling.
    pub max_capacity: u32,
    /// Seats still bookable right now.
    pub available_capacity: u32,
    /// Whether at least one seat is bookable.
    pub is_available: bool,
}

/// Response body for `GET /experiences/{id}/slots`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    /// Queried experience.
    pub experience_id: ExperienceId,
    /// Slots sorted by date then time.
    pub slots: Vec<SlotAvailabilityDto>,
}

/// Request body for `POST /routes`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRouteRequest {
    /// Display name.
    pub name: String,
    /// `sum` or `flat`.
    pub price_mode: PriceMode,
    /// Flat bundle price; required for `flat`.
    #[serde(default)]
    pub price: Option<f64>,
    /// Minimum party size for the flat price to apply.
    #[serde(default = "default_min_party")]
    pub min_party_for_flat: u32,
    /// Member experiences, in itinerary order.
    pub experience_ids: Vec<ExperienceId>,
}

const fn default_min_party() -> u32 {
    1
}

/// Route detail for create and get responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct RouteResponse {
    /// Route identifier.
    pub route_id: RouteId,
    /// Display name.
    pub name: String,
    /// Pricing mode.
    pub price_mode: PriceMode,
    /// Flat bundle price, if any.
    pub price: Option<f64>,
    /// Minimum party size for the flat price.
    pub min_party_for_flat: u32,
    /// Member experiences.
    pub experience_ids: Vec<ExperienceId>,
}

/// Request body for `POST /contacts`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateContactRequest {
    /// Full name.
    pub name: String,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
}

/// Contact detail for create and get responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContactResponse {
    /// Contact identifier.
    pub contact_id: ContactId,
    /// Full name.
    pub name: String,
    /// Phone number, if known.
    pub phone: Option<String>,
    /// Email address, if known.
    pub email: Option<String>,
}
