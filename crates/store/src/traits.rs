//! Storage contracts the ledger engine depends on
//!
//! Backends may be in-memory structures, relational tables with row-level
//! locking, or distributed stores with conditional writes; callers depend
//! only on these traits and their atomicity guarantees.

use crate::error::StoreResult;
use async_trait::async_trait;
use credbank_core::{Credits, PaymentRecord};

/// Keyed mapping from account to credit balance.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Current balance. Unknown accounts read as 0 and never fail.
    async fn balance(&self, account: &str) -> StoreResult<Credits>;

    /// Atomically add `delta` (positive credit, negative debit) and return
    /// the new balance. The non-negativity check and the mutation are one
    /// indivisible step with respect to all other `apply_delta` calls on
    /// the same account; a debit past zero fails with
    /// `StoreError::InsufficientBalance` and changes nothing.
    async fn apply_delta(&self, account: &str, delta: i64) -> StoreResult<Credits>;
}

/// Set of payment references that have already been applied.
#[async_trait]
pub trait IdempotencyIndex: Send + Sync {
    /// Insert `reference` if absent. Exactly one concurrent caller for the
    /// same reference receives `true`.
    async fn try_reserve(&self, reference: &str) -> StoreResult<bool>;

    /// Existence check. Not authoritative for concurrency control; only
    /// `try_reserve` decides races.
    async fn contains(&self, reference: &str) -> StoreResult<bool>;
}

/// Outcome of applying a payment to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditOutcome {
    /// Reference was fresh; the balance was credited.
    Applied { balance: Credits },
    /// Reference was already used; nothing changed.
    Duplicate { balance: Credits },
}

/// Combined ledger storage.
///
/// `apply_payment` exists so the reference reservation and the balance
/// credit commit as a single atomic unit. Running `try_reserve` and
/// `apply_delta` as two calls would leave a crash window in which a
/// reference is marked used with no credit to show for it.
#[async_trait]
pub trait LedgerStore: BalanceStore + IdempotencyIndex {
    /// Reserve `reference`, credit `amount` to `account`, and record the
    /// payment - all or nothing. A reused reference yields
    /// `CreditOutcome::Duplicate` with the current balance.
    async fn apply_payment(
        &self,
        account: &str,
        amount: Credits,
        reference: &str,
    ) -> StoreResult<CreditOutcome>;

    /// Look up the payment record for a reference, if one was applied.
    async fn payment(&self, reference: &str) -> StoreResult<Option<PaymentRecord>>;
}
