//! Core type aliases for the credit ledger

/// Opaque external user identifier
pub type AccountId = String;

/// Integral credit count. Balances are never negative.
pub type Credits = u64;

/// Payment reference - unique identifier of a real-world payment event
/// (for on-chain purchases, the transaction hash).
pub type Reference = String;

/// Largest single credit or debit the ledger accepts. Keeps every delta
/// representable as an `i64` for signed arithmetic and SQL integer columns.
pub const MAX_DELTA: Credits = i64::MAX as Credits;
