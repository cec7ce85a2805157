//! Transaction record types shared by the ingest, finance and cli crates

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of money movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TxnType {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
}

impl TxnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnType::Income => "income",
            TxnType::Expense => "expense",
        }
    }

    /// The opposite direction (used when a statement reports a negative amount)
    pub fn flipped(self) -> Self {
        match self {
            TxnType::Income => TxnType::Expense,
            TxnType::Expense => TxnType::Income,
        }
    }
}

impl fmt::Display for TxnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TxnType::Income),
            "expense" => Ok(TxnType::Expense),
            other => Err(format!("unknown transaction type '{other}' (expected income or expense)")),
        }
    }
}

/// A transaction extracted from a statement, not yet persisted.
///
/// Parsers only emit candidates with a non-empty description and `amount > 0`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionCandidate {
    pub description: String,
    pub amount: f64,
    pub timestamp: NaiveDate,
    #[serde(rename = "type")]
    pub txn_type: TxnType,
    pub category: String,
}

impl TransactionCandidate {
    /// Key used by stores to suppress exact duplicates for one owner.
    pub fn dedup_key(&self, owner: &str) -> DedupKey {
        DedupKey {
            description: self.description.clone(),
            amount_cents: to_cents(self.amount),
            timestamp: self.timestamp,
            owner: owner.to_string(),
        }
    }
}

/// A persisted transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: u64,
    pub owner: String,
    pub description: String,
    pub amount: f64,
    pub timestamp: NaiveDate,
    #[serde(rename = "type")]
    pub txn_type: TxnType,
    pub category: String,
}

impl Transaction {
    pub fn from_candidate(id: u64, owner: &str, c: &TransactionCandidate) -> Self {
        Self {
            id,
            owner: owner.to_string(),
            description: c.description.clone(),
            amount: c.amount,
            timestamp: c.timestamp,
            txn_type: c.txn_type,
            category: c.category.clone(),
        }
    }

    pub fn is_income(&self) -> bool {
        self.txn_type == TxnType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.txn_type == TxnType::Expense
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            description: self.description.clone(),
            amount_cents: to_cents(self.amount),
            timestamp: self.timestamp,
            owner: self.owner.clone(),
        }
    }
}

/// `(description, amount, timestamp, owner)`, amount compared at cent precision
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub description: String,
    pub amount_cents: i64,
    pub timestamp: NaiveDate,
    pub owner: String,
}

fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}
