//! Operation receipts returned to callers

use crate::types::Credits;
use serde::{Deserialize, Serialize};

/// Result of recording a payment.
///
/// `applied: false` means the reference was already credited; this is the
/// expected idempotent-replay outcome, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditReceipt {
    pub applied: bool,
    /// Total balance after the operation (unchanged on replay)
    pub balance: Credits,
}

/// Result of consuming credits.
///
/// `success: false` means the balance was insufficient and nothing was
/// deducted; `balance` reports the untouched balance for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebitReceipt {
    pub success: bool,
    /// Remaining balance after the operation (unchanged on refusal)
    pub balance: Credits,
}
