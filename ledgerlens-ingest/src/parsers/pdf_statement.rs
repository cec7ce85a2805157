//! PDF statement parser (text layer only, no OCR).
//!
//! Expected rows after PDF-to-text:
//!   01/02/2024   UPI/SWIGGY/8812                       320.00 Dr     10,480.00
//!   05 Feb 2024  SALARY ACME CORP                   85,000.00 Cr     95,480.00
//!
//! The patterns match disjoint date layouts, and every pattern runs over the
//! whole text. A transaction printed again elsewhere (a card summary using
//! month names, say) becomes a second candidate; the store's duplicate check
//! keeps one.

use ledgerlens_core::{Categorizer, TxnType};
use regex::{Captures, Regex};
use tracing::info;

use super::{build_candidate, RawTxn};
use crate::error::{IngestError, Result};
use crate::normalize::normalize_amount;
use crate::types::ParseOutput;

const AMOUNT: &str = r"(?P<amount>\(?(?:₹|rs\.?|inr|\$)?[ \t]?\d[\d,]*\.\d{2}\)?)";
const MARKER: &str = r"(?:[ \t]+(?P<marker>dr|cr)\b)?";
const MONTHS: &str = "(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*";

struct TxnPattern {
    name: &'static str,
    regex: Regex,
}

/// Ordered transaction patterns: numeric dates, then month-name dates.
fn transaction_patterns() -> Result<Vec<TxnPattern>> {
    let numeric_date = r"(?P<date>\d{4}-\d{2}-\d{2}|\d{1,2}[/.-]\d{1,2}[/.-]\d{2,4})";
    let month_date = format!(
        r"(?P<date>\d{{1,2}}[ -]{MONTHS}[ -]\d{{2,4}}|{MONTHS}[ \t]+\d{{1,2}},?[ \t]+\d{{4}})"
    );
    let row = |date: &str| format!(r"(?mi)^[ \t]*{date}[ \t]+(?P<desc>\S.*?)[ \t]+{AMOUNT}{MARKER}");

    Ok(vec![
        TxnPattern {
            name: "numeric-date",
            regex: Regex::new(&row(numeric_date))?,
        },
        TxnPattern {
            name: "month-name-date",
            regex: Regex::new(&row(&month_date))?,
        },
    ])
}

/// Text layer of every page, concatenated.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Err(IngestError::UnreadableFile("file is empty".to_string()));
    }

    // pdf-extract can panic on malformed documents
    let text = match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => return Err(IngestError::UnreadableFile(format!("cannot read PDF: {e}"))),
        Err(_) => {
            return Err(IngestError::UnreadableFile(
                "PDF parser failed on this document".to_string(),
            ));
        }
    };

    if text.trim().is_empty() {
        return Err(IngestError::UnreadableFile(
            "PDF has no text layer (scanned statements are not supported)".to_string(),
        ));
    }
    Ok(text)
}

fn marker_type(caps: &Captures<'_>) -> TxnType {
    match caps.name("marker").map(|m| m.as_str().to_lowercase()) {
        Some(m) if m == "cr" => TxnType::Income,
        _ => TxnType::Expense,
    }
}

/// Parse extracted statement text into candidates.
pub fn parse_pdf_text(text: &str, categorizer: &Categorizer) -> Result<ParseOutput> {
    if text.trim().is_empty() {
        return Err(IngestError::UnreadableFile("no text extracted".to_string()));
    }

    let mut out = ParseOutput::default();
    let mut matches = 0;

    for pattern in transaction_patterns()? {
        let before = matches;
        for caps in pattern.regex.captures_iter(text) {
            matches += 1;
            let amount_text = &caps["amount"];
            let outcome = build_candidate(
                RawTxn {
                    date: &caps["date"],
                    description: &caps["desc"],
                    amount: normalize_amount(amount_text),
                    amount_text,
                    txn_type: marker_type(&caps),
                },
                categorizer,
            );
            out.record(matches, outcome);
        }
        tracing::debug!("pattern {} matched {} rows", pattern.name, matches - before);
    }

    info!(
        "Parsed {} transactions from PDF statement ({} matches skipped)",
        out.candidates.len(),
        out.discarded()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SkipReason;
    use chrono::NaiveDate;

    const STATEMENT: &str = r#"
        STATEMENT OF ACCOUNT  01/02/2024 to 29/02/2024
Date         Narration                                 Amount         Balance
01/02/2024   UPI/SWIGGY/8812                       320.00 Dr     10,480.00
05 Feb 2024  SALARY ACME CORP                   85,000.00 Cr     95,480.00
Feb 07, 2024 Netflix subscription                 649.00          94,831.00
09-02-2024   ATM WDL KORAMANGALA               ₹ 2,000.00 DR      92,831.00
"#;

    #[test]
    fn test_parses_both_layouts() {
        let out = parse_pdf_text(STATEMENT, &Categorizer::default()).unwrap();
        assert_eq!(out.candidates.len(), 4);

        // numeric-date matches come first
        let swiggy = &out.candidates[0];
        assert_eq!(swiggy.description, "UPI/SWIGGY/8812");
        assert_eq!(swiggy.amount, 320.0);
        assert_eq!(swiggy.txn_type, TxnType::Expense);
        assert_eq!(swiggy.timestamp, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(swiggy.category, "food_dining");

        let atm = &out.candidates[1];
        assert_eq!(atm.amount, 2000.0);
        assert_eq!(atm.timestamp, NaiveDate::from_ymd_opt(2024, 2, 9).unwrap());

        let salary = &out.candidates[2];
        assert_eq!(salary.description, "SALARY ACME CORP");
        assert_eq!(salary.amount, 85000.0);
        assert_eq!(salary.txn_type, TxnType::Income);

        let netflix = &out.candidates[3];
        assert_eq!(netflix.txn_type, TxnType::Expense);
        assert_eq!(netflix.timestamp, NaiveDate::from_ymd_opt(2024, 2, 7).unwrap());
    }

    #[test]
    fn test_repeat_in_other_layout_gives_second_candidate() {
        let text = "\
03/02/2024   COFFEE SHOP     150.00 Dr
Card summary
03 Feb 2024  COFFEE SHOP     150.00 Dr
";
        let out = parse_pdf_text(text, &Categorizer::default()).unwrap();
        assert_eq!(out.candidates.len(), 2);
        assert_eq!(out.candidates[0], out.candidates[1]);
        assert_eq!(
            out.candidates[0].dedup_key("asha"),
            out.candidates[1].dedup_key("asha")
        );
    }

    #[test]
    fn test_invalid_match_is_skipped() {
        let text = "31/02/2024  Impossible date   100.00 Dr\n02/03/2024  Coffee   80.00\n";
        let out = parse_pdf_text(text, &Categorizer::default()).unwrap();
        assert_eq!(out.candidates.len(), 1);
        assert!(matches!(out.skipped[0].reason, SkipReason::InvalidDate(_)));
    }

    #[test]
    fn test_zero_amount_match_is_skipped() {
        let out = parse_pdf_text("02/03/2024  Reversal   0.00 Cr\n", &Categorizer::default()).unwrap();
        assert!(out.candidates.is_empty());
        assert!(matches!(out.skipped[0].reason, SkipReason::ZeroAmount(_)));
    }

    #[test]
    fn test_text_without_transactions() {
        let out = parse_pdf_text("Thank you for banking with us", &Categorizer::default()).unwrap();
        assert!(out.candidates.is_empty());
        assert!(matches!(
            parse_pdf_text("  \n ", &Categorizer::default()),
            Err(IngestError::UnreadableFile(_))
        ));
    }

    #[test]
    fn test_non_pdf_bytes_are_unreadable() {
        assert!(matches!(extract_pdf_text(b""), Err(IngestError::UnreadableFile(_))));
        assert!(matches!(
            extract_pdf_text(b"Date,Narration\n01/02/2024,Coffee\n"),
            Err(IngestError::UnreadableFile(_))
        ));
    }
}
