//! File-level ingest errors. Row-level problems never surface here; see
//! [`crate::types::SkipReason`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Unreadable file: {0}")]
    UnreadableFile(String),

    #[error("Unrecognized statement layout: {0}")]
    UnrecognizedLayout(String),

    #[error("Unsupported file format '{0}' (expected csv or pdf)")]
    UnsupportedFormat(String),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Failed to save transactions: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;
