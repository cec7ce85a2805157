//! Persistence contract with duplicate suppression

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::finance::{DedupKey, Transaction, TransactionCandidate};

/// Counts returned by a batch save
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub saved: usize,
    pub skipped: usize,
}

/// Anything that can hold transactions for one or more owners.
pub trait TransactionStore {
    /// Persist a single candidate and return its id. Does not deduplicate.
    fn insert(&mut self, owner: &str, candidate: &TransactionCandidate) -> Result<u64>;

    /// Whether an identical `(description, amount, timestamp, owner)` row exists.
    fn contains(&self, key: &DedupKey) -> bool;

    fn transactions(&self) -> &[Transaction];

    /// Persist a batch, skipping exact duplicates of existing rows and of
    /// rows earlier in the same batch.
    fn save(&mut self, owner: &str, candidates: &[TransactionCandidate]) -> Result<SaveOutcome> {
        let mut outcome = SaveOutcome::default();
        for c in candidates {
            if self.contains(&c.dedup_key(owner)) {
                outcome.skipped += 1;
                continue;
            }
            self.insert(owner, c)?;
            outcome.saved += 1;
        }
        Ok(outcome)
    }

    fn for_owner<'a>(&'a self, owner: &'a str) -> Box<dyn Iterator<Item = &'a Transaction> + 'a> {
        Box::new(self.transactions().iter().filter(move |t| t.owner == owner))
    }
}

/// Vector-backed store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    next_id: u64,
    transactions: Vec<Transaction>,
    keys: HashSet<DedupKey>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from previously persisted rows (ids are kept).
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let next_id = transactions.iter().map(|t| t.id).max().unwrap_or(0);
        let keys = transactions.iter().map(Transaction::dedup_key).collect();
        Self {
            next_id,
            transactions,
            keys,
        }
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl TransactionStore for MemoryStore {
    fn insert(&mut self, owner: &str, candidate: &TransactionCandidate) -> Result<u64> {
        self.next_id += 1;
        let txn = Transaction::from_candidate(self.next_id, owner, candidate);
        self.keys.insert(txn.dedup_key());
        self.transactions.push(txn);
        Ok(self.next_id)
    }

    fn contains(&self, key: &DedupKey) -> bool {
        self.keys.contains(key)
    }

    fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}
