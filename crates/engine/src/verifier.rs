//! Payment verification seam
//!
//! The engine never decides on its own whether a payment is real; it
//! requires a [`PaymentVerifier`] and refuses to credit without a positive
//! verdict. Production deployments inject an on-chain verifier; tests and
//! development use [`StaticVerifier`].

use async_trait::async_trait;
use credbank_core::{AccountId, Credits};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// What the verifier learned about a payment reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentVerdict {
    /// True only if the payment really transferred the claimed value.
    pub valid: bool,
    /// Account the payment belongs to.
    pub account: AccountId,
    /// Credits the payment is worth.
    pub amount: Credits,
}

/// Errors while verifying a payment reference.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Unknown payment reference: {0}")]
    UnknownReference(String),

    /// The payment exists but is not yet confirmed; retry later.
    #[error("Payment not yet confirmed: {0}")]
    Unconfirmed(String),

    #[error("Verification backend unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed verification response: {0}")]
    Malformed(String),
}

/// Confirms that a payment reference corresponds to a real payment and
/// reports the account and credit amount it is worth.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    async fn verify(&self, reference: &str) -> Result<PaymentVerdict, VerifyError>;
}

/// Fixed-table verifier for tests and development.
///
/// Every reference not registered is unknown; with an empty table, no
/// payment can ever verify.
#[derive(Default)]
pub struct StaticVerifier {
    verdicts: HashMap<String, PaymentVerdict>,
}

impl StaticVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a valid payment.
    pub fn with_payment(
        mut self,
        reference: impl Into<String>,
        account: impl Into<AccountId>,
        amount: Credits,
    ) -> Self {
        self.verdicts.insert(
            reference.into(),
            PaymentVerdict {
                valid: true,
                account: account.into(),
                amount,
            },
        );
        self
    }

    /// Register a reference that exists but failed verification.
    pub fn with_rejected(
        mut self,
        reference: impl Into<String>,
        account: impl Into<AccountId>,
        amount: Credits,
    ) -> Self {
        self.verdicts.insert(
            reference.into(),
            PaymentVerdict {
                valid: false,
                account: account.into(),
                amount,
            },
        );
        self
    }
}

#[async_trait]
impl PaymentVerifier for StaticVerifier {
    async fn verify(&self, reference: &str) -> Result<PaymentVerdict, VerifyError> {
        self.verdicts
            .get(reference)
            .cloned()
            .ok_or_else(|| VerifyError::UnknownReference(reference.to_string()))
    }
}
