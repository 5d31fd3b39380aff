//! Credbank Store - ledger storage backends
//!
//! The engine depends only on the traits in [`traits`]; two realizations
//! ship with the workspace:
//!
//! - [`MemoryStore`]: dashmap-backed, per-key sharding, no cross-account
//!   locks. Suited to tests and single-process deployments.
//! - [`SqliteStore`]: sqlx/SQLite-backed. Debits are a single conditional
//!   `UPDATE`; payment crediting runs in one transaction so a reference can
//!   never be marked used without its credit committing alongside it.

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{BalanceStore, CreditOutcome, IdempotencyIndex, LedgerStore};
