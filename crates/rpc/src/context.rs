//! Application context - wires everything together

use crate::config::{AppConfig, StorageConfig};
use credbank_chain::RpcVerifier;
use credbank_core::{CreditReceipt, Credits, DebitReceipt};
use credbank_engine::{EngineResult, LedgerEngine, PaymentVerifier, StaticVerifier};
use credbank_journal::{Journal, JournalError, JournalReader, LedgerEvent, LedgerEventKind};
use credbank_store::{LedgerStore, MemoryStore, SqliteStore};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Application context - configured store, verifier, engine and journal.
pub struct AppContext {
    engine: LedgerEngine,
    journal: Journal,
    journal_path: PathBuf,
    sequence: u64,
    config: AppConfig,
}

impl AppContext {
    /// Build a context from configuration.
    pub async fn new(config: AppConfig, data_path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let store: Arc<dyn LedgerStore> = match &config.storage {
            StorageConfig::Memory => Arc::new(MemoryStore::new()),
            StorageConfig::Sqlite { url } => Arc::new(SqliteStore::connect(url).await?),
        };

        let verifier: Arc<dyn PaymentVerifier> = if config.chain.enabled {
            Arc::new(RpcVerifier::new(
                reqwest::Client::new(),
                &config.chain.rpc_url,
                &config.chain.contract_address,
                config.chain.wei_per_credit as u128,
            ))
        } else {
            warn!("chain verification disabled; no payment will verify");
            Arc::new(StaticVerifier::new())
        };

        Self::with_parts(config, store, verifier, data_path)
    }

    /// Wire an explicit store and verifier (tests, embedding).
    pub fn with_parts(
        config: AppConfig,
        store: Arc<dyn LedgerStore>,
        verifier: Arc<dyn PaymentVerifier>,
        data_path: impl AsRef<Path>,
    ) -> Result<Self, anyhow::Error> {
        let journal_path = data_path.as_ref().join("journal");
        std::fs::create_dir_all(&journal_path)?;

        // Resume the sequence from whatever the journal already holds
        let reader = JournalReader::from_directory(&journal_path)?;
        let sequence = reader.last_sequence()?.unwrap_or(0);
        let journal = Journal::new(&journal_path)?;

        Ok(Self {
            engine: LedgerEngine::new(store, verifier),
            journal,
            journal_path,
            sequence,
            config,
        })
    }

    /// Record a verified payment and credit the account.
    pub async fn record_payment(
        &mut self,
        account: &str,
        amount: Credits,
        reference: &str,
    ) -> EngineResult<CreditReceipt> {
        let receipt = self.engine.credit(account, amount, reference).await?;

        let kind = if receipt.applied {
            LedgerEventKind::CreditApplied {
                reference: reference.to_string(),
                amount,
            }
        } else {
            LedgerEventKind::CreditReplayed {
                reference: reference.to_string(),
            }
        };
        self.journal_event(account, kind, receipt.balance);

        Ok(receipt)
    }

    /// Consume credits from an account.
    pub async fn consume(&mut self, account: &str, amount: Credits) -> EngineResult<DebitReceipt> {
        let receipt = self.engine.debit(account, amount).await?;

        let kind = if receipt.success {
            LedgerEventKind::DebitApplied { amount }
        } else {
            LedgerEventKind::DebitRefused { amount }
        };
        self.journal_event(account, kind, receipt.balance);

        Ok(receipt)
    }

    /// Current balance (0 for unknown accounts).
    pub async fn balance(&self, account: &str) -> EngineResult<Credits> {
        self.engine.balance(account).await
    }

    fn journal_event(&mut self, account: &str, kind: LedgerEventKind, balance: Credits) {
        self.sequence += 1;
        let event = LedgerEvent::new(self.sequence, account, kind, balance);
        if let Err(err) = self.journal.append(&event) {
            // The store already committed; a lost audit line must not fail
            // the operation. The audit command surfaces the gap.
            warn!(%err, sequence = event.sequence, "failed to append journal event");
        }
    }

    /// Reader over the journal directory.
    pub fn reader(&self) -> Result<JournalReader, JournalError> {
        JournalReader::from_directory(&self.journal_path)
    }

    /// Compare journal-derived balances against the live store.
    pub async fn audit(&self) -> Result<Vec<AuditFinding>, anyhow::Error> {
        let folded = self.reader()?.fold_balances()?;

        let mut findings = Vec::new();
        for (account, journal_balance) in folded {
            let store_balance = self.engine.balance(&account).await? as i64;
            if journal_balance != store_balance {
                findings.push(AuditFinding {
                    account,
                    journal_balance,
                    store_balance,
                });
            }
        }
        findings.sort_by(|a, b| a.account.cmp(&b.account));

        Ok(findings)
    }

    pub fn engine(&self) -> &LedgerEngine {
        &self.engine
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn last_sequence(&self) -> u64 {
        self.sequence
    }
}

/// A journal/store balance mismatch found by the audit.
#[derive(Debug, Clone, Serialize)]
pub struct AuditFinding {
    pub account: String,
    pub journal_balance: i64,
    pub store_balance: i64,
}
