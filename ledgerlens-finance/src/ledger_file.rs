//! JSON-file backed transaction store

use anyhow::{Context, Result};
use ledgerlens_core::{DedupKey, MemoryStore, Transaction, TransactionCandidate, TransactionStore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    transactions: Vec<Transaction>,
}

/// A [`MemoryStore`] loaded from and flushed to one JSON file.
/// Changes are only written by [`JsonLedger::flush`].
#[derive(Debug)]
pub struct JsonLedger {
    path: PathBuf,
    store: MemoryStore,
}

impl JsonLedger {
    /// Load `path`; a missing file is an empty ledger.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = if path.exists() {
            let s = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
            serde_json::from_str::<LedgerFile>(&s).with_context(|| format!("parse {}", path.display()))?
        } else {
            LedgerFile::default()
        };
        debug!("Loaded {} transactions from {}", file.transactions.len(), path.display());

        Ok(Self {
            path,
            store: MemoryStore::from_transactions(file.transactions),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let file = LedgerFile {
            transactions: self.store.transactions().to_vec(),
        };
        let json = serde_json::to_string_pretty(&file).context("serialize ledger")?;
        fs::write(&self.path, json).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

impl TransactionStore for JsonLedger {
    fn insert(&mut self, owner: &str, candidate: &TransactionCandidate) -> Result<u64> {
        self.store.insert(owner, candidate)
    }

    fn contains(&self, key: &DedupKey) -> bool {
        self.store.contains(key)
    }

    fn transactions(&self) -> &[Transaction] {
        self.store.transactions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledgerlens_core::TxnType;

    fn candidate(desc: &str) -> TransactionCandidate {
        TransactionCandidate {
            description: desc.to_string(),
            amount: 250.0,
            timestamp: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            txn_type: TxnType::Expense,
            category: "other".to_string(),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = JsonLedger::open(dir.path().join("ledger.json")).unwrap();
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn test_round_trip_keeps_dedup_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.json");

        let mut ledger = JsonLedger::open(&path).unwrap();
        ledger.save("alice", &[candidate("Swiggy"), candidate("Uber")]).unwrap();
        ledger.flush().unwrap();

        let mut reopened = JsonLedger::open(&path).unwrap();
        assert_eq!(reopened.transactions().len(), 2);
        let out = reopened.save("alice", &[candidate("Swiggy"), candidate("Metro")]).unwrap();
        assert_eq!(out.saved, 1);
        assert_eq!(out.skipped, 1);
        assert_eq!(reopened.transactions()[2].id, 3);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(JsonLedger::open(&path).is_err());
    }
}
