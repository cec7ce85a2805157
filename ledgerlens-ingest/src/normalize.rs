//! Field normalization shared by the CSV and PDF parsers

use chrono::{Datelike, NaiveDate};

/// Tried in order; the first format that parses wins. Day-first comes before
/// month-first, so `01/02/2024` is 1 February.
pub const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%Y-%m-%d",
    "%d.%m.%Y",
    "%Y/%m/%d",
    "%d/%m/%y",
    "%m/%d/%y",
    "%d-%m-%y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%d %b %y",
    "%d-%b-%y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
];

const CURRENCY_PREFIXES: &[&str] = &["inr", "rs.", "rs", "usd"];
const CURRENCY_SYMBOLS: &[char] = &['₹', '$', '€', '£', '¥'];
const PLACEHOLDERS: &[&str] = &["", "-", "--", "nan", "null", "none", "n/a", "na"];

/// Parse a statement date. Trailing time-of-day (`01/02/2024 10:42` or
/// `2024-02-01T10:42:00`) is ignored.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    try_formats(s)
        .or_else(|| without_time(s.split_once('T')))
        .or_else(|| without_time(s.rsplit_once(char::is_whitespace)))
}

fn try_formats(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        // %Y happily reads "24" as year 24; let the %y formats handle that
        .find(|d| d.year() >= 1900)
}

fn without_time(split: Option<(&str, &str)>) -> Option<NaiveDate> {
    let (date, time) = split?;
    if !time.contains(':') {
        return None;
    }
    try_formats(date.trim())
}

/// Amount text to a number; `None` when it is not a number after cleanup.
///
/// Currency markers, thousands separators and whitespace are removed. A
/// value wrapped in parentheses is negative.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let mut s = raw.trim();
    let negative = s.starts_with('(') && s.ends_with(')');
    if negative {
        s = s[1..s.len() - 1].trim();
    }

    let lower = s.to_lowercase();
    for prefix in CURRENCY_PREFIXES {
        if lower.starts_with(prefix) {
            s = s[prefix.len()..].trim_start();
            break;
        }
    }

    let cleaned: String = s
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Like [`parse_amount`] but unparsable text becomes `0.0`, which callers
/// treat as "no amount".
pub fn normalize_amount(raw: &str) -> f64 {
    parse_amount(raw).unwrap_or(0.0)
}

/// Trim and collapse runs of whitespace (PDF text is full of them).
pub fn normalize_description(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_placeholder(description: &str) -> bool {
    let d = description.trim().to_lowercase();
    PLACEHOLDERS.contains(&d.as_str())
}
