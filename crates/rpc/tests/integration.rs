//! Integration tests for Credbank
//!
//! Verify the complete flow from the API layer through the engine,
//! verifier, store and journal, on both store backends.

use credbank_engine::{EngineError, StaticVerifier};
use credbank_rpc::{AppConfig, AppContext, StorageConfig};
use credbank_store::{BalanceStore, MemoryStore, SqliteStore};
use std::sync::Arc;
use tempfile::TempDir;

fn memory_config() -> AppConfig {
    AppConfig {
        storage: StorageConfig::Memory,
        ..AppConfig::default()
    }
}

fn test_verifier() -> StaticVerifier {
    StaticVerifier::new()
        .with_payment("tx1", "alice", 100)
        .with_payment("tx2", "alice", 100)
        .with_payment("tx3", "bob", 25)
        .with_rejected("tx-bad", "alice", 100)
}

/// Credit → consume → refuse → replay, with the journal tracking along.
#[tokio::test]
async fn test_full_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = AppContext::with_parts(
        memory_config(),
        Arc::new(MemoryStore::new()),
        Arc::new(test_verifier()),
        temp_dir.path(),
    )
    .unwrap();

    // 1. Record a payment
    let receipt = ctx.record_payment("alice", 100, "tx1").await.unwrap();
    assert!(receipt.applied);
    assert_eq!(receipt.balance, 100);

    // 2. Consume part of it
    let receipt = ctx.consume("alice", 40).await.unwrap();
    assert!(receipt.success);
    assert_eq!(receipt.balance, 60);

    // 3. Over-consume is refused, balance untouched
    let receipt = ctx.consume("alice", 100).await.unwrap();
    assert!(!receipt.success);
    assert_eq!(receipt.balance, 60);
    assert_eq!(ctx.balance("alice").await.unwrap(), 60);

    // 4. Replaying the payment changes nothing
    let receipt = ctx.record_payment("alice", 100, "tx1").await.unwrap();
    assert!(!receipt.applied);
    assert_eq!(receipt.balance, 60);

    // 5. Unknown accounts read zero
    assert_eq!(ctx.balance("carol").await.unwrap(), 0);

    // 6. Every operation made it into the journal
    let events = ctx.reader().unwrap().read_all().unwrap();
    assert_eq!(events.len(), 4);
    assert_eq!(ctx.last_sequence(), 4);

    // 7. Journal and store agree
    assert!(ctx.audit().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_payment_not_journaled() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = AppContext::with_parts(
        memory_config(),
        Arc::new(MemoryStore::new()),
        Arc::new(test_verifier()),
        temp_dir.path(),
    )
    .unwrap();

    let err = ctx.record_payment("alice", 100, "tx-bad").await.unwrap_err();
    assert!(matches!(err, EngineError::PaymentRejected(_)));

    let err = ctx.record_payment("alice", 100, "tx-missing").await.unwrap_err();
    assert!(matches!(err, EngineError::PaymentRejected(_)));

    assert_eq!(ctx.balance("alice").await.unwrap(), 0);
    assert!(ctx.reader().unwrap().read_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_input_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = AppContext::with_parts(
        memory_config(),
        Arc::new(MemoryStore::new()),
        Arc::new(test_verifier()),
        temp_dir.path(),
    )
    .unwrap();

    assert!(matches!(
        ctx.record_payment("alice", 0, "tx1").await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        ctx.record_payment("alice", 100, "").await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        ctx.consume("", 10).await,
        Err(EngineError::InvalidInput(_))
    ));
}

/// The SQLite backend keeps balances, applied references and the journal
/// sequence across a restart.
#[tokio::test]
async fn test_sqlite_state_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let db_url = format!("sqlite:{}", temp_dir.path().join("ledger.db").display());
    let config = AppConfig {
        storage: StorageConfig::Sqlite {
            url: db_url.clone(),
        },
        ..AppConfig::default()
    };

    {
        let store = SqliteStore::connect(&db_url).await.unwrap();
        let mut ctx = AppContext::with_parts(
            config.clone(),
            Arc::new(store),
            Arc::new(test_verifier()),
            temp_dir.path(),
        )
        .unwrap();

        ctx.record_payment("alice", 100, "tx1").await.unwrap();
        ctx.consume("alice", 30).await.unwrap();
        assert_eq!(ctx.last_sequence(), 2);
    }

    // Reopen everything from disk
    let store = SqliteStore::connect(&db_url).await.unwrap();
    let mut ctx = AppContext::with_parts(
        config,
        Arc::new(store),
        Arc::new(test_verifier()),
        temp_dir.path(),
    )
    .unwrap();

    assert_eq!(ctx.balance("alice").await.unwrap(), 70);

    // the applied reference is still rejected after restart
    let receipt = ctx.record_payment("alice", 100, "tx1").await.unwrap();
    assert!(!receipt.applied);
    assert_eq!(receipt.balance, 70);

    // the journal sequence resumes instead of restarting
    assert_eq!(ctx.last_sequence(), 3);
    assert!(ctx.audit().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reference_isolation_across_accounts() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = AppContext::with_parts(
        memory_config(),
        Arc::new(MemoryStore::new()),
        Arc::new(test_verifier()),
        temp_dir.path(),
    )
    .unwrap();

    assert!(ctx.record_payment("alice", 100, "tx1").await.unwrap().applied);
    assert!(ctx.record_payment("alice", 100, "tx2").await.unwrap().applied);
    assert!(ctx.record_payment("bob", 25, "tx3").await.unwrap().applied);

    assert_eq!(ctx.balance("alice").await.unwrap(), 200);
    assert_eq!(ctx.balance("bob").await.unwrap(), 25);
}

/// A store write that bypassed the engine shows up as an audit finding.
#[tokio::test]
async fn test_audit_detects_out_of_band_mutation() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(MemoryStore::new());
    let mut ctx = AppContext::with_parts(
        memory_config(),
        store.clone(),
        Arc::new(test_verifier()),
        temp_dir.path(),
    )
    .unwrap();

    ctx.record_payment("alice", 100, "tx1").await.unwrap();
    assert!(ctx.audit().await.unwrap().is_empty());

    // mutate the store behind the journal's back
    store.apply_delta("alice", 7).await.unwrap();

    let findings = ctx.audit().await.unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].account, "alice");
    assert_eq!(findings[0].journal_balance, 100);
    assert_eq!(findings[0].store_balance, 107);
}
