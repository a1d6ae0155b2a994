//! Single-use check-in tokens and their vault.
//!
//! A QR token belongs to exactly one CONFIRMED ticket. At most one live
//! token exists per ticket (re-issuing revokes the prior one) and each
//! token is consumed at most once: consumption is a test-and-set under
//! the per-token mutex, so concurrent scans at two gates cannot both
//! admit.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use utoipa::ToSchema;

use super::ids::TicketId;
use crate::error::BookingError;

/// Length of the opaque token string.
const TOKEN_LEN: usize = 32;

/// Lifecycle state of a check-in token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QrTokenStatus {
    /// Issued and not yet consumed.
    Active,
    /// Consumed at the entry gate; admits nobody again.
    Used,
    /// Administratively invalidated (cancellation or re-issue).
    Revoked,
}

/// A single-use check-in credential bound to one ticket.
#[derive(Debug, Clone)]
pub struct QrToken {
    /// High-entropy opaque token string (unique).
    pub token: String,
    /// Owning ticket.
    pub ticket_id: TicketId,
    /// Past this instant the token no longer admits.
    pub expires_at: DateTime<Utc>,
    /// Current state.
    pub status: QrTokenStatus,
}

/// Generates a 32-character alphanumeric token.
fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Store for check-in tokens, indexed by token string and by ticket.
#[derive(Debug, Default)]
pub struct TokenVault {
    by_token: RwLock<HashMap<String, Arc<Mutex<QrToken>>>>,
    /// Token string of the most recently issued token per ticket.
    by_ticket: RwLock<HashMap<TicketId, String>>,
}

impl TokenVault {
    /// Creates an empty vault.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh ACTIVE token for a ticket.
    ///
    /// Any prior live token for the same ticket is revoked first, keeping
    /// the at-most-one-live-token invariant. The caller checks that the
    /// ticket is CONFIRMED.
    pub async fn issue(&self, ticket_id: TicketId, expires_at: DateTime<Utc>) -> QrToken {
        let _ = self.revoke_for(ticket_id).await;

        let token = QrToken {
            token: generate_token(),
            ticket_id,
            expires_at,
            status: QrTokenStatus::Active,
        };
        self.by_token
            .write()
            .await
            .insert(token.token.clone(), Arc::new(Mutex::new(token.clone())));
        self.by_ticket
            .write()
            .await
            .insert(ticket_id, token.token.clone());
        token
    }

    /// Returns the entry for a token string.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::TokenNotFound`] for an unknown token.
    pub async fn entry(&self, token: &str) -> Result<Arc<Mutex<QrToken>>, BookingError> {
        self.by_token
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(BookingError::TokenNotFound)
    }

    /// Revokes the live token of a ticket, if one exists.
    ///
    /// Returns `true` if an ACTIVE token was revoked. A ticket without a
    /// live token is a no-op. USED tokens are left untouched so the
    /// consumption record survives cancellation.
    pub async fn revoke_for(&self, ticket_id: TicketId) -> bool {
        let token_str = {
            let index = self.by_ticket.read().await;
            index.get(&ticket_id).cloned()
        };
        let Some(token_str) = token_str else {
            return false;
        };
        let Ok(entry) = self.entry(&token_str).await else {
            return false;
        };
        let mut token = entry.lock().await;
        if token.status == QrTokenStatus::Active {
            token.status = QrTokenStatus::Revoked;
            true
        } else {
            false
        }
    }

    /// Returns a snapshot of the current token for a ticket, if any.
    pub async fn token_for(&self, ticket_id: TicketId) -> Option<QrToken> {
        let token_str = {
            let index = self.by_ticket.read().await;
            index.get(&ticket_id).cloned()
        };
        let entry = self.entry(&token_str?).await.ok()?;
        let token = entry.lock().await;
        Some(token.clone())
    }
}
