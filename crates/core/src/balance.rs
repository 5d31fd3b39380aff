//! Account balance record
//!
//! One row per account. Accounts are created implicitly on first credit;
//! a missing record is equivalent to a zero balance.

use crate::error::{CoreError, CoreResult};
use crate::types::{AccountId, Credits};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Credit balance of a single account.
///
/// The balance is a `u64`, so a negative balance is unrepresentable.
/// `updated_at` is advisory metadata and never used for conflict
/// resolution; atomicity lives in the store operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Opaque external user identifier
    pub account_id: AccountId,
    /// Current credit balance
    pub balance: Credits,
    /// Timestamp of the last mutation
    pub updated_at: DateTime<Utc>,
}

impl AccountBalance {
    /// Create a fresh zero-balance record for an account
    pub fn new(account_id: impl Into<AccountId>) -> Self {
        Self {
            account_id: account_id.into(),
            balance: 0,
            updated_at: Utc::now(),
        }
    }

    /// Apply a signed delta and return the new balance.
    ///
    /// The check and the mutation are one step: a negative delta larger
    /// than the balance fails with `InsufficientBalance` and leaves the
    /// record untouched.
    pub fn apply_delta(&mut self, delta: i64) -> CoreResult<Credits> {
        let new_balance = if delta >= 0 {
            self.balance
                .checked_add(delta as Credits)
                .ok_or_else(|| CoreError::InvalidAmount("balance overflow".to_string()))?
        } else {
            let needed = delta.unsigned_abs();
            self.balance
                .checked_sub(needed)
                .ok_or(CoreError::InsufficientBalance {
                    needed,
                    available: self.balance,
                })?
        };

        self.balance = new_balance;
        self.updated_at = Utc::now();
        Ok(new_balance)
    }

    pub fn has_sufficient(&self, amount: Credits) -> bool {
        self.balance >= amount
    }
}

impl fmt::Display for AccountBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} credits", self.account_id, self.balance)
    }
}
