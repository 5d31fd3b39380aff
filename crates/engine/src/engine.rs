//! Ledger engine - credit, debit and balance orchestration

use crate::error::{EngineError, EngineResult};
use crate::validation;
use crate::verifier::PaymentVerifier;
use credbank_core::{CreditReceipt, Credits, DebitReceipt};
use credbank_store::{CreditOutcome, LedgerStore, StoreError};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Orchestrates all ledger mutations.
///
/// The engine exclusively owns write access to the store; the API layer
/// and tests mutate only through it. Operations on different accounts
/// proceed fully in parallel - serialization lives in the store, keyed per
/// account and per reference.
pub struct LedgerEngine {
    store: Arc<dyn LedgerStore>,
    verifier: Arc<dyn PaymentVerifier>,
}

impl LedgerEngine {
    pub fn new(store: Arc<dyn LedgerStore>, verifier: Arc<dyn PaymentVerifier>) -> Self {
        Self { store, verifier }
    }

    /// Record a verified payment and credit the account.
    ///
    /// Flow: validate -> verify -> apply. A reused reference is the
    /// expected idempotent-replay path and comes back as
    /// `applied: false` with the unchanged balance; calling this again
    /// with the same reference is always safe.
    pub async fn credit(
        &self,
        account: &str,
        amount: Credits,
        reference: &str,
    ) -> EngineResult<CreditReceipt> {
        // 1. Reject malformed input before touching anything
        validation::validate_credit_request(account, amount, reference)?;

        // 2. The payment must be confirmed real, for this account, at this
        //    amount. A mismatch means the claim does not describe the
        //    payment and nothing is credited.
        let verdict = self.verifier.verify(reference).await?;
        if !verdict.valid {
            warn!(reference, account, "payment failed verification");
            return Err(EngineError::PaymentRejected(format!(
                "payment {reference} failed on-chain verification"
            )));
        }
        if verdict.account != account {
            warn!(reference, account, verified = %verdict.account, "payment account mismatch");
            return Err(EngineError::PaymentRejected(format!(
                "payment {reference} belongs to a different account"
            )));
        }
        if verdict.amount != amount {
            warn!(
                reference,
                claimed = amount,
                verified = verdict.amount,
                "payment amount mismatch"
            );
            return Err(EngineError::PaymentRejected(format!(
                "payment {reference} is worth {} credits, not {amount}",
                verdict.amount
            )));
        }

        // 3. Reserve the reference and credit the balance as one atomic
        //    unit in the store.
        match self.store.apply_payment(account, amount, reference).await? {
            CreditOutcome::Applied { balance } => {
                info!(account, amount, reference, balance, "credits applied");
                Ok(CreditReceipt {
                    applied: true,
                    balance,
                })
            }
            CreditOutcome::Duplicate { balance } => {
                debug!(account, reference, "payment replay ignored");
                Ok(CreditReceipt {
                    applied: false,
                    balance,
                })
            }
        }
    }

    /// Consume credits from an account.
    ///
    /// Deducts the full amount or nothing. An insufficient balance is a
    /// normal refused outcome, not an error; the untouched balance is
    /// reported for diagnostics. NOT idempotent: a timed-out call may have
    /// committed, so check the balance before retrying.
    pub async fn debit(&self, account: &str, amount: Credits) -> EngineResult<DebitReceipt> {
        validation::validate_debit_request(account, amount)?;

        match self.store.apply_delta(account, -(amount as i64)).await {
            Ok(balance) => {
                info!(account, amount, balance, "credits consumed");
                Ok(DebitReceipt {
                    success: true,
                    balance,
                })
            }
            Err(StoreError::InsufficientBalance { available, .. }) => {
                debug!(account, amount, available, "debit refused");
                Ok(DebitReceipt {
                    success: false,
                    balance: available,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Current balance. Pure read; unknown accounts read as 0.
    pub async fn balance(&self, account: &str) -> EngineResult<Credits> {
        Ok(self.store.balance(account).await?)
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }
}
