//! Request validation
//!
//! Preconditions checked synchronously, before any store or verifier
//! call: a rejected request mutates nothing.

use credbank_core::{CoreError, CoreResult, Credits, MAX_DELTA};

pub fn validate_account(account: &str) -> CoreResult<()> {
    if account.trim().is_empty() {
        return Err(CoreError::EmptyAccount);
    }
    Ok(())
}

pub fn validate_amount(amount: Credits) -> CoreResult<()> {
    if amount == 0 {
        return Err(CoreError::InvalidAmount("amount must be positive".to_string()));
    }
    if amount > MAX_DELTA {
        return Err(CoreError::InvalidAmount(format!(
            "amount exceeds maximum delta {MAX_DELTA}"
        )));
    }
    Ok(())
}

pub fn validate_reference(reference: &str) -> CoreResult<()> {
    if reference.trim().is_empty() {
        return Err(CoreError::EmptyReference);
    }
    Ok(())
}

/// Validate a record-payment request.
pub fn validate_credit_request(account: &str, amount: Credits, reference: &str) -> CoreResult<()> {
    validate_account(account)?;
    validate_amount(amount)?;
    validate_reference(reference)
}

/// Validate a consume-credits request.
pub fn validate_debit_request(account: &str, amount: Credits) -> CoreResult<()> {
    validate_account(account)?;
    validate_amount(amount)
}
