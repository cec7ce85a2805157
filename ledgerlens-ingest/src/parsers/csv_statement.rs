//! Generic CSV statement parser.
//!
//! Works off header names rather than a fixed bank layout:
//!   Date,Narration,Chq./Ref.No.,Value Dt,Withdrawal Amt.,Deposit Amt.,Closing Balance
//!   01/02/24,UPI-SWIGGY-8812,0000412,01/02/24,320.00,,10480.00
//!
//! Preamble lines (account holder, period) above the header are skipped.

use csv::{ReaderBuilder, StringRecord, Trim};
use ledgerlens_core::{Categorizer, TxnType};
use tracing::info;

use super::{build_candidate, RawTxn};
use crate::columns::{AmountColumns, ColumnMap};
use crate::error::{IngestError, Result};
use crate::normalize::normalize_amount;
use crate::types::{ParseOutput, RowOutcome, SkipReason};

/// How far down the file the header row may appear
const HEADER_SEARCH_ROWS: usize = 20;

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

/// Parse decoded CSV text into candidates.
pub fn parse_csv_text(text: &str, categorizer: &Categorizer) -> Result<ParseOutput> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    // (record number, record or read error), blank records dropped
    let rows: Vec<(usize, std::result::Result<StringRecord, String>)> = rdr
        .records()
        .enumerate()
        .map(|(i, r)| (i + 1, r.map_err(|e| e.to_string())))
        .filter(|(_, r)| !matches!(r, Ok(rec) if is_blank(rec)))
        .collect();

    if rows.is_empty() {
        return Err(IngestError::UnreadableFile("statement has no rows".to_string()));
    }

    let (header_pos, columns) = rows
        .iter()
        .take(HEADER_SEARCH_ROWS)
        .enumerate()
        .find_map(|(pos, (_, r))| {
            let rec = r.as_ref().ok()?;
            ColumnMap::detect(rec.iter()).map(|map| (pos, map))
        })
        .ok_or_else(|| {
            let first = match &rows[0].1 {
                Ok(rec) => rec.iter().collect::<Vec<_>>().join(", "),
                Err(e) => e.clone(),
            };
            tracing::warn!("rejecting CSV: no date/description header (first row: {})", first);
            IngestError::UnrecognizedLayout(format!(
                "no date and description columns found (first row: {first})"
            ))
        })?;

    let data = &rows[header_pos + 1..];
    if data.is_empty() {
        return Err(IngestError::UnreadableFile(
            "statement has a header but no transaction rows".to_string(),
        ));
    }

    let mut out = ParseOutput::default();
    for (row, result) in data {
        let outcome = match result {
            Ok(record) => parse_row(record, &columns, categorizer),
            Err(e) => RowOutcome::Skipped(SkipReason::Malformed(e.clone())),
        };
        out.record(*row, outcome);
    }

    info!(
        "Parsed {} transactions from CSV statement ({} rows skipped)",
        out.candidates.len(),
        out.discarded()
    );
    Ok(out)
}

fn parse_row(record: &StringRecord, columns: &ColumnMap, categorizer: &Categorizer) -> RowOutcome {
    let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

    let (amount, amount_text, txn_type) = match columns.amount {
        AmountColumns::Combined(idx) => {
            let text = field(Some(idx));
            (normalize_amount(text), text, TxnType::Expense)
        }
        AmountColumns::Split { debit, credit } => {
            let debit_text = field(debit);
            let credit_text = field(credit);
            let debit_amt = normalize_amount(debit_text);
            let credit_amt = normalize_amount(credit_text);
            if debit_amt != 0.0 {
                (debit_amt, debit_text, TxnType::Expense)
            } else if credit_amt != 0.0 {
                (credit_amt, credit_text, TxnType::Income)
            } else {
                (0.0, debit_text, TxnType::Expense)
            }
        }
        AmountColumns::Missing => return RowOutcome::Skipped(SkipReason::NoAmountColumn),
    };

    build_candidate(
        RawTxn {
            date: field(Some(columns.date)),
            description: field(Some(columns.description)),
            amount,
            amount_text,
            txn_type,
        },
        categorizer,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledgerlens_core::{ClassifyError, Classifier, KeywordTable};
    use std::sync::Arc;

    struct DownClassifier;

    impl Classifier for DownClassifier {
        fn classify(&self, _description: &str) -> std::result::Result<String, ClassifyError> {
            Err(ClassifyError::Unavailable)
        }
    }

    fn categorizer() -> Categorizer {
        Categorizer::new(Arc::new(DownClassifier), KeywordTable::default())
    }

    #[test]
    fn test_single_debit_row() {
        let text = "Date, Narration, Debit, Credit\n01/02/2024, Coffee Shop, 150, \n";
        let out = parse_csv_text(text, &categorizer()).unwrap();
        assert_eq!(out.candidates.len(), 1);
        let c = &out.candidates[0];
        assert_eq!(c.description, "Coffee Shop");
        assert_eq!(c.amount, 150.0);
        assert_eq!(c.txn_type, TxnType::Expense);
        assert_eq!(c.timestamp, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(c.category, "food_dining");
    }

    #[test]
    fn test_credit_only_is_income() {
        let text = "\
Date,Description,Withdrawal,Deposit,Balance
05/03/2024,SALARY ACME CORP,,\"85,000.00\",\"1,02,300.00\"
06/03/2024,ATM CASH,2000,0,\"1,00,300.00\"
";
        let out = parse_csv_text(text, &categorizer()).unwrap();
        assert_eq!(out.candidates.len(), 2);
        assert_eq!(out.candidates[0].txn_type, TxnType::Income);
        assert_eq!(out.candidates[0].amount, 85000.0);
        assert_eq!(out.candidates[0].category, "salary");
        assert_eq!(out.candidates[1].txn_type, TxnType::Expense);
        assert_eq!(out.candidates[1].amount, 2000.0);
    }

    #[test]
    fn test_combined_amount_is_expense() {
        let text = "\
Transaction Date,Details,Amount
2024-04-01,Netflix,649
2024-04-02,Uber trip,\"1,234.50\"
";
        let out = parse_csv_text(text, &categorizer()).unwrap();
        assert_eq!(out.candidates.len(), 2);
        assert!(out.candidates.iter().all(|c| c.txn_type == TxnType::Expense));
        assert_eq!(out.candidates[1].amount, 1234.50);
    }

    #[test]
    fn test_parenthesised_amount_becomes_income() {
        let text = "Date,Description,Amount\n2024-04-03,Refund Amazon,(500)\n";
        let out = parse_csv_text(text, &categorizer()).unwrap();
        assert_eq!(out.candidates[0].amount, 500.0);
        assert_eq!(out.candidates[0].txn_type, TxnType::Income);
    }

    #[test]
    fn test_bad_rows_are_skipped_not_fatal() {
        let text = "\
Date,Narration,Debit,Credit
01/02/2024,Coffee Shop,150,
not a date,Swiggy,200,
02/02/2024,,99,
03/02/2024,Zero row,0,0
04/02/2024,Bad amount,abc,
05/02/2024,Zomato,310.40,
";
        let out = parse_csv_text(text, &categorizer()).unwrap();
        assert_eq!(out.candidates.len(), 2);
        assert_eq!(out.discarded(), 4);
        assert_eq!(out.skipped[0].row, 3);
        assert!(matches!(out.skipped[0].reason, SkipReason::InvalidDate(_)));
        assert_eq!(out.skipped[1].reason, SkipReason::EmptyDescription);
        assert!(matches!(out.skipped[2].reason, SkipReason::ZeroAmount(_)));
        assert!(matches!(out.skipped[3].reason, SkipReason::ZeroAmount(_)));
    }

    #[test]
    fn test_preamble_before_header() {
        let text = "\
Account Holder: R Sharma
Statement Period: 01/02/2024 to 29/02/2024

Date,Particulars,Withdrawal Amt.,Deposit Amt.,Closing Balance
10/02/2024,BigBasket order,1200.00,,8800.00
";
        let out = parse_csv_text(text, &categorizer()).unwrap();
        assert_eq!(out.candidates.len(), 1);
        assert_eq!(out.candidates[0].category, "groceries");
    }

    #[test]
    fn test_unrecognized_layout() {
        let text = "When,Merchant,Value\n01/02/2024,Coffee,150\n";
        let err = parse_csv_text(text, &categorizer()).unwrap_err();
        assert!(matches!(err, IngestError::UnrecognizedLayout(_)));
    }

    #[test]
    fn test_header_only_is_unreadable() {
        let err = parse_csv_text("Date,Narration,Debit,Credit\n", &categorizer()).unwrap_err();
        assert!(matches!(err, IngestError::UnreadableFile(_)));
    }

    #[test]
    fn test_missing_amount_columns_skip_rows() {
        let text = "Date,Description\n01/02/2024,Coffee\n";
        let out = parse_csv_text(text, &categorizer()).unwrap();
        assert!(out.candidates.is_empty());
        assert_eq!(out.skipped[0].reason, SkipReason::NoAmountColumn);
    }
}
