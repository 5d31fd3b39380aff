//! Storage layer errors

use credbank_core::Credits;
use thiserror::Error;

/// Errors raised by ledger storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A debit would take the balance below zero. The balance is untouched.
    #[error("Insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: Credits, available: Credits },

    /// The backing store cannot complete the operation right now.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row violates the data model (e.g. a negative balance).
    #[error("Corrupt ledger state: {0}")]
    Corrupt(String),
}

/// Result type alias with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn is_insufficient_balance(&self) -> bool {
        matches!(self, StoreError::InsufficientBalance { .. })
    }

    /// Transient failures the caller may retry. Retrying a credit is safe
    /// (idempotent by reference); retrying a debit requires a balance check
    /// first, since the original attempt may have committed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = StoreError::InsufficientBalance {
            needed: 15,
            available: 10,
        };
        assert!(err.is_insufficient_balance());
        assert!(!err.is_retryable());

        let err = StoreError::Unavailable("connection reset".to_string());
        assert!(err.is_retryable());

        let err = StoreError::Corrupt("negative balance row".to_string());
        assert!(!err.is_retryable());
    }
}
