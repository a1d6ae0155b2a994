//! Persistence layer: PostgreSQL booking event log.
//!
//! The engine itself is in-memory; the event log is an append-only audit
//! trail fed by the broadcast bus, with periodic cleanup of old rows.

pub mod postgres;
