//! In-memory ledger store
//!
//! Backed by `DashMap`, so every operation locks only the shard owning its
//! key: mutations on one account never stall another, and the entry API
//! gives the atomic check-then-act `apply_delta` and `try_reserve` need.
//! Lock order is references before balances everywhere.

use crate::error::{StoreError, StoreResult};
use crate::traits::{BalanceStore, CreditOutcome, IdempotencyIndex, LedgerStore};
use async_trait::async_trait;
use credbank_core::{AccountBalance, AccountId, CoreError, Credits, PaymentRecord, Reference};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// In-memory realization of [`LedgerStore`].
///
/// Reservation and credit cannot diverge across a crash here: both live in
/// process memory and die together. The reservation is still ordered before
/// the balance mutation, matching the durable backends.
#[derive(Default)]
pub struct MemoryStore {
    balances: DashMap<AccountId, AccountBalance>,
    /// `None` marks a bare reservation, `Some` an applied payment.
    references: DashMap<Reference, Option<PaymentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account_count(&self) -> usize {
        self.balances.len()
    }

    fn mutate(&self, account: &str, delta: i64) -> StoreResult<Credits> {
        match self.balances.entry(account.to_string()) {
            Entry::Occupied(mut occupied) => occupied
                .get_mut()
                .apply_delta(delta)
                .map_err(domain_to_store),
            Entry::Vacant(vacant) => {
                if delta < 0 {
                    return Err(StoreError::InsufficientBalance {
                        needed: delta.unsigned_abs(),
                        available: 0,
                    });
                }
                let mut record = AccountBalance::new(account);
                let balance = record.apply_delta(delta).map_err(domain_to_store)?;
                vacant.insert(record);
                Ok(balance)
            }
        }
    }
}

fn domain_to_store(err: CoreError) -> StoreError {
    match err {
        CoreError::InsufficientBalance { needed, available } => {
            StoreError::InsufficientBalance { needed, available }
        }
        other => StoreError::Corrupt(other.to_string()),
    }
}

#[async_trait]
impl BalanceStore for MemoryStore {
    async fn balance(&self, account: &str) -> StoreResult<Credits> {
        Ok(self.balances.get(account).map(|b| b.balance).unwrap_or(0))
    }

    async fn apply_delta(&self, account: &str, delta: i64) -> StoreResult<Credits> {
        self.mutate(account, delta)
    }
}

#[async_trait]
impl IdempotencyIndex for MemoryStore {
    async fn try_reserve(&self, reference: &str) -> StoreResult<bool> {
        match self.references.entry(reference.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(vacant) => {
                vacant.insert(None);
                Ok(true)
            }
        }
    }

    async fn contains(&self, reference: &str) -> StoreResult<bool> {
        Ok(self.references.contains_key(reference))
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn apply_payment(
        &self,
        account: &str,
        amount: Credits,
        reference: &str,
    ) -> StoreResult<CreditOutcome> {
        match self.references.entry(reference.to_string()) {
            Entry::Occupied(_) => {
                let balance = self.balances.get(account).map(|b| b.balance).unwrap_or(0);
                Ok(CreditOutcome::Duplicate { balance })
            }
            Entry::Vacant(vacant) => {
                // Reservation first; the guard drops before the balance shard
                // is touched.
                vacant.insert(Some(PaymentRecord::new(reference, account, amount)));

                match self.mutate(account, amount as i64) {
                    Ok(balance) => Ok(CreditOutcome::Applied { balance }),
                    Err(err) => {
                        // Release the reservation so a retry can apply.
                        self.references.remove(reference);
                        Err(err)
                    }
                }
            }
        }
    }

    async fn payment(&self, reference: &str) -> StoreResult<Option<PaymentRecord>> {
        Ok(self
            .references
            .get(reference)
            .and_then(|entry| entry.value().clone()))
    }
}
