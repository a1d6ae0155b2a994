//! Per-connection subscription manager.
//!
//! Tracks which tickets a WebSocket client is subscribed to and
//! provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::TicketId;

/// Manages the set of ticket subscriptions for a single WebSocket
/// connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed ticket IDs. If `subscribe_all` is true, this set is
    /// ignored.
    ticket_ids: HashSet<TicketId>,
    /// Whether the client subscribes to all tickets (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds ticket IDs to the subscription set. `"*"` enables the
    /// wildcard.
    pub fn subscribe(&mut self, ids: &[TicketId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        for id in ids {
            self.ticket_ids.insert(*id);
        }
    }

    /// Removes ticket IDs from the subscription set.
    pub fn unsubscribe(&mut self, ids: &[TicketId]) {
        for id in ids {
            self.ticket_ids.remove(id);
        }
    }

    /// Returns `true` if the given ticket ID matches the filter.
    #[must_use]
    pub fn matches(&self, ticket_id: TicketId) -> bool {
        self.subscribe_all || self.ticket_ids.contains(&ticket_id)
    }

    /// Returns the number of explicitly subscribed ticket IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.ticket_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(TicketId::new()));
    }

    #[test]
    fn subscribe_specific_ticket() {
        let mut mgr = SubscriptionManager::new();
        let id = TicketId::new();
        mgr.subscribe(&[id], false);
        assert!(mgr.matches(id));
        assert!(!mgr.matches(TicketId::new()));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert!(mgr.matches(TicketId::new()));
        assert!(mgr.matches(TicketId::new()));
    }

    #[test]
    fn unsubscribe_removes_ticket() {
        let mut mgr = SubscriptionManager::new();
        let id = TicketId::new();
        mgr.subscribe(&[id], false);
        assert!(mgr.matches(id));
        mgr.unsubscribe(&[id]);
        assert!(!mgr.matches(id));
    }

    #[test]
    fn count_tracks_explicit() {
        let mut mgr = SubscriptionManager::new();
        assert_eq!(mgr.count(), 0);
        mgr.subscribe(&[TicketId::new(), TicketId::new()], false);
        assert_eq!(mgr.count(), 2);
    }
}
