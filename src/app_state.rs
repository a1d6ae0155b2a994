//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::domain::EventBus;
use crate::service::{BookingService, CheckinService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Booking service for ticket, deposit, and catalog operations.
    pub booking_service: Arc<BookingService>,
    /// Check-in service for QR token issuance and verification.
    pub checkin_service: Arc<CheckinService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Effective server configuration.
    pub config: Arc<ServerConfig>,
}
