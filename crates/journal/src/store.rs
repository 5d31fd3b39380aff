//! JSONL journal - append-only writer

use crate::error::JournalError;
use crate::event::LedgerEvent;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only JSONL journal, one file per day.
pub struct Journal {
    base_path: PathBuf,
    current_file: Option<BufWriter<File>>,
    current_date: Option<String>,
}

impl Journal {
    /// Create a journal rooted at the given directory.
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;

        Ok(Self {
            base_path,
            current_file: None,
            current_date: None,
        })
    }

    /// Append an event as one JSON line.
    pub fn append(&mut self, event: &LedgerEvent) -> Result<(), JournalError> {
        let date = event.timestamp.format("%Y-%m-%d").to_string();

        // Rotate file if the date changed
        if self.current_date.as_ref() != Some(&date) {
            self.rotate_file(&date)?;
        }

        if let Some(ref mut writer) = self.current_file {
            let json = serde_json::to_string(event)?;
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }

        Ok(())
    }

    fn rotate_file(&mut self, date: &str) -> Result<(), JournalError> {
        if let Some(ref mut writer) = self.current_file {
            writer.flush()?;
        }

        let file_path = self.base_path.join(format!("{}.jsonl", date));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;

        self.current_file = Some(BufWriter::new(file));
        self.current_date = Some(date.to_string());

        Ok(())
    }

    /// Flush and close the current file.
    pub fn close(&mut self) -> Result<(), JournalError> {
        if let Some(ref mut writer) = self.current_file {
            writer.flush()?;
        }
        self.current_file = None;
        self.current_date = None;
        Ok(())
    }
}

impl Drop for Journal {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LedgerEventKind;
    use crate::reader::JournalReader;
    use tempfile::TempDir;

    #[test]
    fn test_append_and_read_back() {
        let dir = TempDir::new().unwrap();
        let mut journal = Journal::new(dir.path()).unwrap();

        journal
            .append(&LedgerEvent::new(
                1,
                "alice",
                LedgerEventKind::CreditApplied {
                    reference: "tx1".to_string(),
                    amount: 100,
                },
                100,
            ))
            .unwrap();
        journal
            .append(&LedgerEvent::new(
                2,
                "alice",
                LedgerEventKind::DebitApplied { amount: 40 },
                60,
            ))
            .unwrap();

        let reader = JournalReader::from_directory(dir.path()).unwrap();
        let events = reader.read_all().unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, 1);
        assert_eq!(events[1].balance, 60);
        assert_eq!(reader.last_sequence().unwrap(), Some(2));
    }
}
