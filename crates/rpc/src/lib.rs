//! Credbank RPC - ledger API orchestrator
//!
//! Thin translation layer between callers and the ledger engine: wires the
//! configured store, verifier and journal into an [`AppContext`], and maps
//! commands onto engine calls. No ledger logic lives here.

pub mod commands;
pub mod config;
pub mod context;

pub use config::{AppConfig, ChainConfig, ConfigError, CreditPackage, StorageConfig};
pub use context::{AppContext, AuditFinding};
