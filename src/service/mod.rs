//! Orchestration services over the domain layer.

pub mod booking_service;
pub mod checkin_service;
pub mod sweeper;

pub use booking_service::{
    BookingService, DepositSnapshot, HoldPolicy, NewTicket, SlotAvailability, TicketSnapshot,
};
pub use checkin_service::{CheckinService, CheckinSummary};
pub use sweeper::ExpirationSweeper;
