//! Domain errors for the credit ledger

use crate::types::Credits;
use thiserror::Error;

/// Core domain errors - business conditions, not infrastructure failures.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: Credits, available: Credits },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Payment reference must not be empty")]
    EmptyReference,

    #[error("Account identifier must not be empty")]
    EmptyAccount,
}

/// Result type alias with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn is_insufficient_balance(&self) -> bool {
        matches!(self, CoreError::InsufficientBalance { .. })
    }

    /// True for malformed-request errors rejected before any mutation.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidAmount(_) | CoreError::EmptyReference | CoreError::EmptyAccount
        )
    }
}
