//! Aggregate views over stored transactions: balance, per-month totals and
//! category breakdowns. All maps are `BTreeMap`s so output order is stable.

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use ledgerlens_core::{Transaction, TxnType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Calendar month, displayed as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Month::of(date) == *self
    }
}

impl FromStr for Month {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (y, m) = s
            .trim()
            .split_once('-')
            .with_context(|| format!("invalid month '{s}', use YYYY-MM"))?;
        let digits = |part: &str, len: usize| part.len() == len && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(y, 4) || !digits(m, 2) {
            bail!("invalid month '{s}', use YYYY-MM");
        }
        let year: i32 = y.parse().with_context(|| format!("invalid year in '{s}'"))?;
        let month: u32 = m.parse().with_context(|| format!("invalid month in '{s}'"))?;
        if !(1..=12).contains(&month) {
            bail!("invalid month '{s}', use YYYY-MM");
        }
        Ok(Month { year, month })
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

impl BalanceSummary {
    fn add(&mut self, txn: &Transaction) {
        match txn.txn_type {
            TxnType::Income => self.income += txn.amount,
            TxnType::Expense => self.expense += txn.amount,
        }
        self.balance = self.income - self.expense;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBalance {
    pub month: String,
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

/// Total income, total expense, and the difference
pub fn balance<'a>(txns: impl IntoIterator<Item = &'a Transaction>) -> BalanceSummary {
    let mut summary = BalanceSummary::default();
    for t in txns {
        summary.add(t);
    }
    summary
}

/// Income/expense/balance per month, oldest first
pub fn monthly_balance<'a>(txns: impl IntoIterator<Item = &'a Transaction>) -> Vec<MonthlyBalance> {
    let mut by_month: BTreeMap<Month, BalanceSummary> = BTreeMap::new();
    for t in txns {
        by_month.entry(Month::of(t.timestamp)).or_default().add(t);
    }
    by_month
        .into_iter()
        .map(|(month, s)| MonthlyBalance {
            month: month.to_string(),
            income: s.income,
            expense: s.expense,
            balance: s.balance,
        })
        .collect()
}

/// Totals per category for one transaction type
pub fn category_breakdown<'a>(
    txns: impl IntoIterator<Item = &'a Transaction>,
    txn_type: TxnType,
) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for t in txns.into_iter().filter(|t| t.txn_type == txn_type) {
        *totals.entry(t.category.clone()).or_insert(0.0) += t.amount;
    }
    totals
}

/// Totals per category within one month, income and expense together
pub fn month_summary<'a>(
    txns: impl IntoIterator<Item = &'a Transaction>,
    month: Month,
) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for t in txns.into_iter().filter(|t| month.contains(t.timestamp)) {
        *totals.entry(t.category.clone()).or_insert(0.0) += t.amount;
    }
    totals
}

/// Expense totals keyed by `YYYY-MM`, then category
pub fn expense_by_month_and_category<'a>(
    txns: impl IntoIterator<Item = &'a Transaction>,
) -> BTreeMap<String, BTreeMap<String, f64>> {
    let mut summary: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for t in txns.into_iter().filter(|t| t.is_expense()) {
        *summary
            .entry(Month::of(t.timestamp).to_string())
            .or_default()
            .entry(t.category.clone())
            .or_insert(0.0) += t.amount;
    }
    summary
}
