//! JSONL journal reader - sequential replay

use crate::error::JournalError;
use crate::event::LedgerEvent;
use credbank_core::AccountId;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Sequential reader over all journal files in a directory.
pub struct JournalReader {
    files: Vec<std::path::PathBuf>,
}

impl JournalReader {
    pub fn from_directory(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let path = path.as_ref();
        let mut files = Vec::new();

        if path.exists() {
            for entry in std::fs::read_dir(path)? {
                let entry = entry?;
                let file_path = entry.path();
                if file_path.extension().map_or(false, |ext| ext == "jsonl") {
                    files.push(file_path);
                }
            }
        }

        files.sort();

        Ok(Self { files })
    }

    /// Read all events from all files in order.
    pub fn read_all(&self) -> Result<Vec<LedgerEvent>, JournalError> {
        let mut events = Vec::new();

        for file_path in &self.files {
            let file = File::open(file_path)?;
            let reader = BufReader::new(file);

            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let event: LedgerEvent = serde_json::from_str(&line)?;
                events.push(event);
            }
        }

        Ok(events)
    }

    /// Last sequence number across all files, if any events exist.
    pub fn last_sequence(&self) -> Result<Option<u64>, JournalError> {
        Ok(self.read_all()?.into_iter().map(|e| e.sequence).max())
    }

    /// Fold the journal into per-account balances.
    ///
    /// Signed accumulation: a corrupt or truncated journal may fold to a
    /// negative number, which the audit surfaces instead of panicking.
    pub fn fold_balances(&self) -> Result<HashMap<AccountId, i64>, JournalError> {
        let mut balances: HashMap<AccountId, i64> = HashMap::new();

        for event in self.read_all()? {
            let delta = event.delta();
            if delta != 0 {
                *balances.entry(event.account_id).or_insert(0) += delta;
            }
        }

        Ok(balances)
    }
}
