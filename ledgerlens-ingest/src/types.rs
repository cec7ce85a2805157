use ledgerlens_core::TransactionCandidate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{IngestError, Result};

/// How many row-level problems an upload report carries back to the caller
pub const MAX_REPORTED_ERRORS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementFormat {
    Csv,
    Pdf,
}

impl StatementFormat {
    /// `csv` / `pdf`, case-insensitive, leading dot allowed
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.trim().trim_start_matches('.').to_lowercase().as_str() {
            "csv" => Ok(StatementFormat::Csv),
            "pdf" => Ok(StatementFormat::Pdf),
            other => Err(IngestError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| IngestError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_extension(ext)
    }
}

/// Why a row or text match did not become a candidate
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    InvalidDate(String),
    EmptyDescription,
    /// Zero, blank, or not a number
    ZeroAmount(String),
    NoAmountColumn,
    Malformed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InvalidDate(raw) => write!(f, "unrecognized date '{raw}'"),
            SkipReason::EmptyDescription => f.write_str("empty description"),
            SkipReason::ZeroAmount(raw) => write!(f, "amount is zero or unparsable '{raw}'"),
            SkipReason::NoAmountColumn => f.write_str("no amount, debit or credit column"),
            SkipReason::Malformed(msg) => write!(f, "malformed row: {msg}"),
        }
    }
}

/// Result of extracting a single row or match
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Parsed(TransactionCandidate),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based record number (CSV) or match number (PDF)
    pub row: usize,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.reason)
    }
}

/// Candidates in statement order plus everything that was dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutput {
    pub candidates: Vec<TransactionCandidate>,
    pub skipped: Vec<SkippedRow>,
}

impl ParseOutput {
    pub fn record(&mut self, row: usize, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Parsed(c) => self.candidates.push(c),
            RowOutcome::Skipped(reason) => {
                tracing::debug!("skipping row {}: {}", row, reason);
                self.skipped.push(SkippedRow { row, reason });
            }
        }
    }

    pub fn discarded(&self) -> usize {
        self.skipped.len()
    }

    /// First `limit` skip messages
    pub fn error_messages(&self, limit: usize) -> Vec<String> {
        self.skipped.iter().take(limit).map(|s| s.to_string()).collect()
    }
}

/// What an upload reports back to its caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReport {
    pub total_parsed: usize,
    pub saved_count: usize,
    pub duplicates: usize,
    pub skipped_rows: usize,
    pub errors: Vec<String>,
}
