//! WebSocket message types: envelope, commands, and the ticket filter
//! they carry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::TicketId;

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands a client can send in a [`WsMessage`] payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Start receiving events for the given tickets. `"*"` subscribes to
    /// every ticket.
    Subscribe {
        /// Ticket IDs (or `"*"`) to subscribe to.
        ticket_ids: Vec<String>,
    },
    /// Stop receiving events for the given tickets.
    Unsubscribe {
        /// Ticket IDs to unsubscribe from.
        ticket_ids: Vec<String>,
    },
}

/// A parsed ticket filter from a command's `ticket_ids` list: the IDs
/// that parsed as UUIDs, and whether the wildcard was present.
#[derive(Debug, Default)]
pub struct TicketFilter {
    /// Ticket IDs named explicitly.
    pub ids: Vec<TicketId>,
    /// `true` when the list contained `"*"`.
    pub wildcard: bool,
}

impl TicketFilter {
    /// Parses a raw `ticket_ids` list, ignoring entries that are neither
    /// a UUID nor `"*"`.
    #[must_use]
    pub fn parse(raw: &[String]) -> Self {
        let mut filter = Self::default();
        for entry in raw {
            if entry == "*" {
                filter.wildcard = true;
            } else if let Ok(uuid) = entry.parse::<uuid::Uuid>() {
                filter.ids.push(TicketId::from_uuid(uuid));
            }
        }
        filter
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn filter_parses_uuids_and_wildcard() {
        let id = uuid::Uuid::new_v4();
        let raw = vec![id.to_string(), "*".to_string(), "not-a-uuid".to_string()];
        let filter = TicketFilter::parse(&raw);
        assert_eq!(filter.ids, vec![TicketId::from_uuid(id)]);
        assert!(filter.wildcard);
    }

    #[test]
    fn subscribe_command_deserializes_from_payload() {
        let payload = serde_json::json!({
            "command": "subscribe",
            "ticket_ids": ["*"]
        });
        let Ok(command) = serde_json::from_value::<WsCommand>(payload) else {
            panic!("command parse failed");
        };
        assert!(matches!(command, WsCommand::Subscribe { .. }));
    }
}
