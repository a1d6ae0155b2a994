//! Deposit records and the deposit calculator.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::catalog::DepositPolicy;
use super::ids::{DepositId, TicketId};
use super::pricing::round_currency;

/// Payment progress of a deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositStatus {
    /// Nothing paid yet.
    Pending,
    /// Some but not all of the required amount paid. Capacity stays held.
    Partial,
    /// Fully paid; the owning ticket is confirmed.
    Paid,
}

/// Pre-payment obligation attached to exactly one ticket.
///
/// Created alongside the ticket when its deposit policy requires one,
/// mutated only by payment-recording events, never deleted while the
/// ticket is active.
#[derive(Debug, Clone)]
pub struct Deposit {
    /// Unique identifier.
    pub id: DepositId,
    /// Owning ticket.
    pub ticket_id: TicketId,
    /// Amount that must be paid for the ticket to confirm.
    pub amount_required: f64,
    /// Amount paid so far.
    pub amount_paid: f64,
    /// Payment progress.
    pub status: DepositStatus,
    /// Deadline mirroring the ticket's hold expiry.
    pub due_at: DateTime<Utc>,
    /// When the deposit reached the required amount.
    pub paid_at: Option<DateTime<Utc>>,
}

impl Deposit {
    /// Creates a new PENDING deposit for a ticket.
    #[must_use]
    pub fn new(ticket_id: TicketId, amount_required: f64, due_at: DateTime<Utc>) -> Self {
        Self {
            id: DepositId::new(),
            ticket_id,
            amount_required,
            amount_paid: 0.0,
            status: DepositStatus::Pending,
            due_at,
            paid_at: None,
        }
    }

    /// Applies a payment, moving the deposit to PARTIAL or PAID.
    ///
    /// Returns `true` when this payment completed the deposit. The caller
    /// is responsible for precondition checks (ticket still PENDING,
    /// deposit not already PAID).
    pub fn apply_payment(&mut self, amount: f64, now: DateTime<Utc>) -> bool {
        self.amount_paid = round_currency(self.amount_paid + amount);
        if self.amount_paid >= self.amount_required {
            self.status = DepositStatus::Paid;
            self.paid_at = Some(now);
            true
        } else {
            self.status = DepositStatus::Partial;
            false
        }
    }

    /// Amount still outstanding.
    #[must_use]
    pub fn amount_remaining(&self) -> f64 {
        round_currency((self.amount_required - self.amount_paid).max(0.0))
    }
}

/// Derives the deposit obligation from a total price and a policy.
///
/// Returns `(required, amount)`:
/// - [`DepositPolicy::None`] → `(false, 0.0)`.
/// - [`DepositPolicy::Percentage`] → rounded percentage of the total.
/// - [`DepositPolicy::Fixed`] → the fixed value, capped at the total
///   price (a booking never requires a deposit larger than its price).
///
/// Deterministic, no I/O.
#[must_use]
pub fn compute_deposit(total_price: f64, policy: &DepositPolicy) -> (bool, f64) {
    match policy {
        DepositPolicy::None => (false, 0.0),
        DepositPolicy::Percentage { value } => {
            (true, round_currency(total_price * value / 100.0))
        }
        DepositPolicy::Fixed { value } => (true, round_currency(value.min(total_price))),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn no_policy_requires_nothing() {
        assert_eq!(compute_deposit(300.0, &DepositPolicy::None), (false, 0.0));
    }

    #[test]
    fn percentage_twenty_of_three_hundred_is_sixty() {
        let (required, amount) =
            compute_deposit(300.0, &DepositPolicy::Percentage { value: 20.0 });
        assert!(required);
        assert_eq!(amount, 60.0);
    }

    #[test]
    fn percentage_rounds_to_currency_precision() {
        let (_, amount) = compute_deposit(99.99, &DepositPolicy::Percentage { value: 33.0 });
        assert_eq!(amount, 33.0); // 32.9967 rounds up
    }

    #[test]
    fn fixed_deposit_is_capped_at_total_price() {
        let (required, amount) = compute_deposit(50.0, &DepositPolicy::Fixed { value: 80.0 });
        assert!(required);
        assert_eq!(amount, 50.0);

        let (_, uncapped) = compute_deposit(200.0, &DepositPolicy::Fixed { value: 80.0 });
        assert_eq!(uncapped, 80.0);
    }

    #[test]
    fn partial_payment_keeps_deposit_open() {
        let mut deposit = Deposit::new(TicketId::new(), 60.0, Utc::now());
        let completed = deposit.apply_payment(25.0, Utc::now());
        assert!(!completed);
        assert_eq!(deposit.status, DepositStatus::Partial);
        assert_eq!(deposit.amount_remaining(), 35.0);
        assert!(deposit.paid_at.is_none());
    }

    #[test]
    fn cumulative_payments_complete_the_deposit() {
        let mut deposit = Deposit::new(TicketId::new(), 60.0, Utc::now());
        let _ = deposit.apply_payment(25.0, Utc::now());
        let completed = deposit.apply_payment(35.0, Utc::now());
        assert!(completed);
        assert_eq!(deposit.status, DepositStatus::Paid);
        assert_eq!(deposit.amount_remaining(), 0.0);
        assert!(deposit.paid_at.is_some());
    }
}
