//! Applied payment records
//!
//! One immutable record per payment reference, created exactly once when a
//! credit first succeeds. Retained for the life of the account so replays
//! of the same reference can be rejected and audited.

use crate::types::{AccountId, Credits, Reference};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A payment that has been applied to an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Unique payment reference (e.g. the on-chain transaction hash)
    pub reference: Reference,
    /// Account the credits were granted to
    pub account_id: AccountId,
    /// Credits granted by this payment
    pub credits_granted: Credits,
    /// When the credit was applied
    pub applied_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn new(
        reference: impl Into<Reference>,
        account_id: impl Into<AccountId>,
        credits_granted: Credits,
    ) -> Self {
        Self {
            reference: reference.into(),
            account_id: account_id.into(),
            credits_granted,
            applied_at: Utc::now(),
        }
    }
}

impl fmt::Display for PaymentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({} credits)",
            self.reference, self.account_id, self.credits_granted
        )
    }
}
