//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection:
//! subscription commands update the per-connection ticket filter, and
//! matching booking events are forwarded as they arrive on the bus.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{TicketFilter, WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::BookingEvent;

/// Runs the read/write loop for a single WebSocket connection.
pub async fn run_connection(socket: WebSocket, mut event_rx: broadcast::Receiver<BookingEvent>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = dispatch_command(&text, &mut subs);
                        let Ok(json) = serde_json::to_string(&reply) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Event from EventBus
            event = event_rx.recv() => {
                match event {
                    Ok(booking_event) => {
                        if subs.matches(booking_event.ticket_id()) {
                            let msg = WsMessage {
                                id: uuid::Uuid::new_v4().to_string(),
                                msg_type: WsMessageType::Event,
                                timestamp: chrono::Utc::now(),
                                payload: serde_json::to_value(&booking_event).unwrap_or_default(),
                            };
                            let Ok(json) = serde_json::to_string(&msg) else {
                                continue;
                            };
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Applies one client text frame to the subscription filter and builds
/// the reply envelope.
fn dispatch_command(text: &str, subs: &mut SubscriptionManager) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return error_reply(String::new(), 400, "malformed JSON");
    };

    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return error_reply(msg.id, 404, "unknown command");
    };

    match command {
        WsCommand::Subscribe { ticket_ids } => {
            let filter = TicketFilter::parse(&ticket_ids);
            subs.subscribe(&filter.ids, filter.wildcard);
            response_reply(
                msg.id,
                serde_json::json!({
                    "subscribed": filter.ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { ticket_ids } => {
            let filter = TicketFilter::parse(&ticket_ids);
            subs.unsubscribe(&filter.ids);
            response_reply(
                msg.id,
                serde_json::json!({
                    "unsubscribed": filter.ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "remaining_count": subs.count(),
                }),
            )
        }
    }
}

fn response_reply(id: String, payload: serde_json::Value) -> WsMessage {
    WsMessage {
        id,
        msg_type: WsMessageType::Response,
        timestamp: chrono::Utc::now(),
        payload,
    }
}

fn error_reply(id: String, code: u32, message: &str) -> WsMessage {
    WsMessage {
        id,
        msg_type: WsMessageType::Error,
        timestamp: chrono::Utc::now(),
        payload: serde_json::json!({
            "code": code,
            "message": message,
        }),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::TicketId;

    fn command_frame(id: &str, payload: serde_json::Value) -> String {
        serde_json::to_string(&WsMessage {
            id: id.to_string(),
            msg_type: WsMessageType::Command,
            timestamp: chrono::Utc::now(),
            payload,
        })
        .unwrap_or_default()
    }

    #[test]
    fn malformed_frame_yields_error_reply() {
        let mut subs = SubscriptionManager::new();
        let reply = dispatch_command("{not json", &mut subs);
        assert_eq!(reply.msg_type, WsMessageType::Error);
        assert_eq!(reply.payload.get("code"), Some(&serde_json::json!(400)));
    }

    #[test]
    fn unknown_command_yields_error_reply() {
        let mut subs = SubscriptionManager::new();
        let frame = command_frame("req-1", serde_json::json!({"command": "teleport"}));
        let reply = dispatch_command(&frame, &mut subs);
        assert_eq!(reply.msg_type, WsMessageType::Error);
        assert_eq!(reply.id, "req-1");
    }

    #[test]
    fn subscribe_updates_filter_and_echoes_ids() {
        let mut subs = SubscriptionManager::new();
        let ticket_id = TicketId::new();
        let frame = command_frame(
            "req-2",
            serde_json::json!({
                "command": "subscribe",
                "ticket_ids": [ticket_id.to_string()]
            }),
        );

        let reply = dispatch_command(&frame, &mut subs);
        assert_eq!(reply.msg_type, WsMessageType::Response);
        assert!(subs.matches(ticket_id));
        assert!(!subs.is_subscribed_all());
        assert_eq!(reply.payload.get("count"), Some(&serde_json::json!(1)));
    }

    #[test]
    fn wildcard_subscribe_matches_any_ticket() {
        let mut subs = SubscriptionManager::new();
        let frame = command_frame(
            "req-3",
            serde_json::json!({"command": "subscribe", "ticket_ids": ["*"]}),
        );

        let reply = dispatch_command(&frame, &mut subs);
        assert_eq!(reply.msg_type, WsMessageType::Response);
        assert!(subs.matches(TicketId::new()));
        assert_eq!(reply.payload.get("wildcard"), Some(&serde_json::json!(true)));
    }

    #[test]
    fn unsubscribe_narrows_filter() {
        let mut subs = SubscriptionManager::new();
        let ticket_id = TicketId::new();
        subs.subscribe(&[ticket_id], false);

        let frame = command_frame(
            "req-4",
            serde_json::json!({
                "command": "unsubscribe",
                "ticket_ids": [ticket_id.to_string()]
            }),
        );
        let reply = dispatch_command(&frame, &mut subs);
        assert_eq!(reply.msg_type, WsMessageType::Response);
        assert!(!subs.matches(ticket_id));
        assert_eq!(
            reply.payload.get("remaining_count"),
            Some(&serde_json::json!(0))
        );
    }
}
