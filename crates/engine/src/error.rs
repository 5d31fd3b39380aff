//! Engine errors

use crate::verifier::VerifyError;
use credbank_core::CoreError;
use credbank_store::StoreError;
use thiserror::Error;

/// Errors during ledger operations.
///
/// Business outcomes are NOT errors: an insufficient-balance debit and a
/// replayed payment reference come back inside the receipts. These
/// variants cover malformed requests, rejected payments, and
/// infrastructure failures.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed request, rejected before any mutation.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] CoreError),

    /// The payment could not be confirmed as real; nothing was credited.
    #[error("Payment rejected: {0}")]
    PaymentRejected(String),

    /// The verification backend could not answer; retry later.
    #[error("Payment verifier unavailable: {0}")]
    VerifierUnavailable(String),

    /// The backing store failed. Either the mutation committed or it did
    /// not; the caller must re-query rather than assume failure.
    #[error("Storage error: {0}")]
    Storage(StoreError),
}

/// Result type alias with EngineError
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Transient failures the caller may retry. Crediting is retry-safe by
    /// reference; debits require a balance check first.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::VerifierUnavailable(_) => true,
            EngineError::Storage(err) => err.is_retryable(),
            _ => false,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        EngineError::Storage(err)
    }
}

impl From<VerifyError> for EngineError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::UnknownReference(reference) => {
                EngineError::PaymentRejected(format!("unknown payment reference: {reference}"))
            }
            VerifyError::Unconfirmed(reference) => {
                EngineError::VerifierUnavailable(format!("payment not yet confirmed: {reference}"))
            }
            VerifyError::Unavailable(msg) | VerifyError::Malformed(msg) => {
                EngineError::VerifierUnavailable(msg)
            }
        }
    }
}
