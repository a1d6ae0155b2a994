//! Domain layer: catalog, capacity ledger, tickets, deposits, pricing,
//! check-in tokens, and the event system.

pub mod booking_event;
pub mod capacity;
pub mod catalog;
pub mod deposit;
pub mod event_bus;
pub mod ids;
pub mod pricing;
pub mod qr_token;
pub mod store;
pub mod ticket;

pub use booking_event::BookingEvent;
pub use capacity::{CapacityLedger, ReservationHandle};
pub use catalog::Catalog;
pub use event_bus::EventBus;
pub use ids::{ContactId, DepositId, ExperienceId, ReservationId, RouteId, SlotId, TicketId};
pub use qr_token::TokenVault;
pub use store::BookingStore;
