//! Request/response DTOs for the REST API.

pub mod booking_dto;
pub mod catalog_dto;
pub mod checkin_dto;
pub mod deposit_dto;

pub use booking_dto::{CreateTicketRequest, TicketResponse};
pub use catalog_dto::{
    AvailabilityParams, AvailabilityResponse, ContactResponse, CreateContactRequest,
    CreateExperienceRequest, CreateRouteRequest, CreateSlotRequest, ExperienceResponse,
    RouteResponse, SlotAvailabilityDto, SlotResponse, UpdateExperienceStatusRequest,
};
pub use checkin_dto::{
    CheckinResponse, CheckinStatusResponse, QrTokenResponse, RevokeTokenResponse,
    VerifyTokenRequest,
};
pub use deposit_dto::{DepositResponse, RecordPaymentRequest};
