//! Listing stored transactions with filters and paging

use chrono::NaiveDate;
use ledgerlens_core::{Transaction, TxnType};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Inclusive
    pub start: Option<NaiveDate>,
    /// Inclusive
    pub end: Option<NaiveDate>,
    pub category: Option<String>,
    pub txn_type: Option<TxnType>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            category: None,
            txn_type: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl TransactionFilter {
    pub fn matches(&self, t: &Transaction) -> bool {
        self.start.is_none_or(|s| t.timestamp >= s)
            && self.end.is_none_or(|e| t.timestamp <= e)
            && self.category.as_deref().is_none_or(|c| t.category == c)
            && self.txn_type.is_none_or(|ty| t.txn_type == ty)
    }

    /// Newest first (ties broken by newest id), then `offset` and `limit`.
    pub fn apply<'a>(&self, txns: impl IntoIterator<Item = &'a Transaction>) -> Vec<&'a Transaction> {
        let mut hits: Vec<&Transaction> = txns.into_iter().filter(|t| self.matches(t)).collect();
        hits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        hits.into_iter().skip(self.offset).take(self.limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(id: u64, day: u32, txn_type: TxnType, category: &str) -> Transaction {
        Transaction {
            id,
            owner: "alice".to_string(),
            description: format!("txn {id}"),
            amount: 100.0,
            timestamp: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            txn_type,
            category: category.to_string(),
        }
    }

    fn sample() -> Vec<Transaction> {
        (1..=15)
            .map(|i| {
                let (ty, cat) = if i % 5 == 0 {
                    (TxnType::Income, "salary")
                } else {
                    (TxnType::Expense, "food_dining")
                };
                txn(i as u64, i, ty, cat)
            })
            .collect()
    }

    #[test]
    fn test_default_limit_newest_first() {
        let txns = sample();
        let hits = TransactionFilter::default().apply(&txns);
        assert_eq!(hits.len(), 10);
        assert_eq!(hits[0].id, 15);
        assert_eq!(hits[9].id, 6);
    }

    #[test]
    fn test_filters_and_paging() {
        let txns = sample();
        let filter = TransactionFilter {
            start: NaiveDate::from_ymd_opt(2024, 6, 3),
            end: NaiveDate::from_ymd_opt(2024, 6, 12),
            category: Some("food_dining".to_string()),
            txn_type: Some(TxnType::Expense),
            limit: 3,
            offset: 2,
        };
        let ids: Vec<u64> = filter.apply(&txns).iter().map(|t| t.id).collect();
        // matching days: 12, 11, 9, 8, 7, 6, 4, 3 -> skip 2 -> take 3
        assert_eq!(ids, vec![9, 8, 7]);
    }

    #[test]
    fn test_type_filter() {
        let txns = sample();
        let filter = TransactionFilter {
            txn_type: Some(TxnType::Income),
            ..Default::default()
        };
        let hits = filter.apply(&txns);
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|t| t.is_income()));
    }
}
