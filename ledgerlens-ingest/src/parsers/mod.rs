pub mod csv_statement;
pub mod pdf_statement;

use ledgerlens_core::{Categorizer, TransactionCandidate, TxnType};

use crate::normalize::{is_placeholder, normalize_description, parse_date};
use crate::types::{RowOutcome, SkipReason};

/// Fields pulled out of one row or text match, before validation
pub(crate) struct RawTxn<'a> {
    pub date: &'a str,
    pub description: &'a str,
    pub amount: f64,
    /// Source text of `amount`, for skip messages
    pub amount_text: &'a str,
    pub txn_type: TxnType,
}

/// Validate and categorize. A negative amount flips the inferred type and is
/// stored as its absolute value, so every candidate has `amount > 0`.
pub(crate) fn build_candidate(raw: RawTxn<'_>, categorizer: &Categorizer) -> RowOutcome {
    let Some(timestamp) = parse_date(raw.date) else {
        return RowOutcome::Skipped(SkipReason::InvalidDate(raw.date.trim().to_string()));
    };

    let description = normalize_description(raw.description);
    if is_placeholder(&description) {
        return RowOutcome::Skipped(SkipReason::EmptyDescription);
    }

    if raw.amount == 0.0 {
        return RowOutcome::Skipped(SkipReason::ZeroAmount(raw.amount_text.trim().to_string()));
    }
    let (amount, txn_type) = if raw.amount < 0.0 {
        (-raw.amount, raw.txn_type.flipped())
    } else {
        (raw.amount, raw.txn_type)
    };

    let category = categorizer.categorize(&description);
    RowOutcome::Parsed(TransactionCandidate {
        description,
        amount,
        timestamp,
        txn_type,
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw<'a>(date: &'a str, description: &'a str, amount: f64) -> RawTxn<'a> {
        RawTxn {
            date,
            description,
            amount,
            amount_text: "",
            txn_type: TxnType::Expense,
        }
    }

    #[test]
    fn test_builds_candidate() {
        let out = build_candidate(raw("01/02/2024", " Swiggy  order ", 320.0), &Categorizer::default());
        let c = match out {
            RowOutcome::Parsed(c) => c,
            other => panic!("expected a candidate, got {other:?}"),
        };
        assert_eq!(c.description, "Swiggy order");
        assert_eq!(c.timestamp, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(c.category, "food_dining");
    }

    #[test]
    fn test_negative_amount_flips_type() {
        let out = build_candidate(raw("01/02/2024", "Refund", -500.0), &Categorizer::default());
        let c = match out {
            RowOutcome::Parsed(c) => c,
            other => panic!("expected a candidate, got {other:?}"),
        };
        assert_eq!(c.amount, 500.0);
        assert_eq!(c.txn_type, TxnType::Income);
    }

    #[test]
    fn test_skip_reasons() {
        let cat = Categorizer::default();
        assert_eq!(
            build_candidate(raw("yesterday", "Swiggy", 1.0), &cat),
            RowOutcome::Skipped(SkipReason::InvalidDate("yesterday".to_string()))
        );
        assert_eq!(
            build_candidate(raw("01/02/2024", "nan", 1.0), &cat),
            RowOutcome::Skipped(SkipReason::EmptyDescription)
        );
        assert!(matches!(
            build_candidate(raw("01/02/2024", "Swiggy", 0.0), &cat),
            RowOutcome::Skipped(SkipReason::ZeroAmount(_))
        ));
    }
}
