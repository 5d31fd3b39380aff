//! Database schema definitions
//!
//! Row types for sqlx mapping from the SQLite tables. The schema is
//! created in code at connect time (idempotent `CREATE TABLE IF NOT
//! EXISTS`), so a fresh database file is usable immediately.

use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use credbank_core::PaymentRecord;
use serde::{Deserialize, Serialize};

/// The CHECK constraint backstops the conditional-update debit path: the
/// database refuses a negative balance even if a future query forgets the
/// guard.
pub const CREATE_BALANCES: &str = r#"
CREATE TABLE IF NOT EXISTS balances (
    account_id TEXT PRIMARY KEY,
    balance INTEGER NOT NULL DEFAULT 0 CHECK (balance >= 0),
    updated_at TEXT NOT NULL
)
"#;

/// `account_id` and `credits_granted` are NULL for a bare reservation
/// made through the idempotency index alone; applying a payment writes
/// the full row.
pub const CREATE_PAYMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS payments (
    reference TEXT PRIMARY KEY,
    account_id TEXT,
    credits_granted INTEGER,
    applied_at TEXT NOT NULL
)
"#;

pub const CREATE_PAYMENTS_ACCOUNT_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_payments_account ON payments(account_id)
"#;

/// Row type for the `payments` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct PaymentRow {
    pub reference: String,
    pub account_id: Option<String>,
    pub credits_granted: Option<i64>,
    pub applied_at: DateTime<Utc>,
}

impl PaymentRow {
    /// Convert a complete row into a domain record. Bare reservations
    /// (NULL account) are not payment records.
    pub fn into_record(self) -> StoreResult<PaymentRecord> {
        let account_id = self
            .account_id
            .ok_or_else(|| StoreError::Corrupt(format!("payment {} has no account", self.reference)))?;
        let granted = self
            .credits_granted
            .ok_or_else(|| StoreError::Corrupt(format!("payment {} has no amount", self.reference)))?;
        let credits_granted = u64::try_from(granted)
            .map_err(|_| StoreError::Corrupt(format!("payment {} has negative amount", self.reference)))?;

        Ok(PaymentRecord {
            reference: self.reference,
            account_id,
            credits_granted,
            applied_at: self.applied_at,
        })
    }
}
