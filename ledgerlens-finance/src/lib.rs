//! ledgerlens-finance: reports, transaction queries, the JSON ledger and the
//! HTTP classifier client

pub mod ledger_file;
pub mod query;
pub mod remote_classifier;
pub mod reports;

pub use ledger_file::JsonLedger;
pub use query::TransactionFilter;
pub use remote_classifier::RemoteClassifier;
pub use reports::{
    balance, category_breakdown, expense_by_month_and_category, month_summary, monthly_balance,
    BalanceSummary, Month, MonthlyBalance,
};
