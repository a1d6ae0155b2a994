//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams booking lifecycle events to
//! clients, filtered per connection by ticket ID or wildcard.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
