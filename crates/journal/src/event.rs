//! Ledger events

use chrono::{DateTime, Utc};
use credbank_core::{AccountId, Credits, Reference};
use serde::{Deserialize, Serialize};

/// What happened to an account's balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEventKind {
    /// A verified payment credited the account.
    CreditApplied {
        reference: Reference,
        amount: Credits,
    },
    /// A payment reference was replayed; nothing changed.
    CreditReplayed { reference: Reference },
    /// Credits were consumed.
    DebitApplied { amount: Credits },
    /// A debit was refused for insufficient balance; nothing changed.
    DebitRefused { amount: Credits },
}

/// One settled ledger operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Monotonic sequence number within the journal
    pub sequence: u64,
    pub account_id: AccountId,
    #[serde(flatten)]
    pub kind: LedgerEventKind,
    /// Balance after the operation (unchanged for replays and refusals)
    pub balance: Credits,
    pub timestamp: DateTime<Utc>,
}

impl LedgerEvent {
    pub fn new(
        sequence: u64,
        account_id: impl Into<AccountId>,
        kind: LedgerEventKind,
        balance: Credits,
    ) -> Self {
        Self {
            sequence,
            account_id: account_id.into(),
            kind,
            balance,
            timestamp: Utc::now(),
        }
    }

    /// Signed balance effect of this event.
    pub fn delta(&self) -> i64 {
        match &self.kind {
            LedgerEventKind::CreditApplied { amount, .. } => *amount as i64,
            LedgerEventKind::DebitApplied { amount } => -(*amount as i64),
            LedgerEventKind::CreditReplayed { .. } | LedgerEventKind::DebitRefused { .. } => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_roundtrip() {
        let event = LedgerEvent::new(
            7,
            "alice",
            LedgerEventKind::CreditApplied {
                reference: "tx1".to_string(),
                amount: 100,
            },
            100,
        );

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""kind":"credit_applied""#));

        let back: LedgerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sequence, 7);
        assert_eq!(back.delta(), 100);
    }

    #[test]
    fn test_deltas() {
        let credit = LedgerEventKind::CreditApplied {
            reference: "tx1".to_string(),
            amount: 30,
        };
        assert_eq!(LedgerEvent::new(1, "a", credit, 30).delta(), 30);

        let debit = LedgerEventKind::DebitApplied { amount: 10 };
        assert_eq!(LedgerEvent::new(2, "a", debit, 20).delta(), -10);

        let refused = LedgerEventKind::DebitRefused { amount: 99 };
        assert_eq!(LedgerEvent::new(3, "a", refused, 20).delta(), 0);
    }
}
