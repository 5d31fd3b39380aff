//! Credbank Engine - ledger orchestration
//!
//! This is the HEART of credbank. All balance mutations go through the
//! [`LedgerEngine`], which enforces the invariants the rest of the system
//! relies on: every payment reference credits at most once, no balance
//! ever goes negative, and no credit applies without a positive verdict
//! from the injected [`PaymentVerifier`].

pub mod engine;
pub mod error;
pub mod validation;
pub mod verifier;

pub use engine::LedgerEngine;
pub use error::{EngineError, EngineResult};
pub use validation::{validate_credit_request, validate_debit_request};
pub use verifier::{PaymentVerdict, PaymentVerifier, StaticVerifier, VerifyError};
