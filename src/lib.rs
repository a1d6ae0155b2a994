//! # slotgate
//!
//! Booking and availability engine for capacity-limited, slot-based
//! experiences: tours, activities, and events sold per time slot.
//!
//! The engine prices bookings (individually or via multi-experience
//! routes), derives deposits, holds slot capacity against a hard
//! ceiling, drives tickets through a small state machine, sweeps
//! expired holds in the background, and issues single-use QR check-in
//! tokens. State lives in memory; PostgreSQL keeps an append-only
//! audit log of booking events.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── BookingService / CheckinService (service/)
//!     ├── ExpirationSweeper (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── Catalog / CapacityLedger / BookingStore / TokenVault (domain/)
//!     │
//!     └── PostgreSQL event log (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
