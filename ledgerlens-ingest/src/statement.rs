//! StatementParser: uploaded bytes in, candidates (and an upload report) out.

use ledgerlens_core::{Categorizer, TransactionStore};
use tracing::{info, warn};

use crate::decode::decode_text;
use crate::error::{IngestError, Result};
use crate::parsers::csv_statement::parse_csv_text;
use crate::parsers::pdf_statement::{extract_pdf_text, parse_pdf_text};
use crate::types::{ParseOutput, StatementFormat, UploadReport, MAX_REPORTED_ERRORS};

/// Parses one statement per call. Holds no per-upload state, so a single
/// parser can serve concurrent uploads.
#[derive(Debug, Clone, Default)]
pub struct StatementParser {
    categorizer: Categorizer,
}

impl StatementParser {
    pub fn new(categorizer: Categorizer) -> Self {
        Self { categorizer }
    }

    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    pub fn parse(&self, bytes: &[u8], format: StatementFormat) -> Result<ParseOutput> {
        let result = match format {
            StatementFormat::Csv => self.parse_csv(bytes),
            StatementFormat::Pdf => self.parse_pdf(bytes),
        };
        if let Err(e) = &result {
            warn!("Rejected {:?} statement: {}", format, e);
        }
        result
    }

    pub fn parse_csv(&self, bytes: &[u8]) -> Result<ParseOutput> {
        let (text, encoding) = decode_text(bytes)?;
        tracing::debug!("Decoded CSV statement as {:?}", encoding);
        parse_csv_text(&text, &self.categorizer)
    }

    pub fn parse_pdf(&self, bytes: &[u8]) -> Result<ParseOutput> {
        let text = extract_pdf_text(bytes)?;
        parse_pdf_text(&text, &self.categorizer)
    }

    /// Parse, then hand candidates to `store`, which drops exact duplicates.
    pub fn import<S: TransactionStore + ?Sized>(
        &self,
        bytes: &[u8],
        format: StatementFormat,
        owner: &str,
        store: &mut S,
    ) -> Result<UploadReport> {
        let parsed = self.parse(bytes, format)?;
        let saved = store
            .save(owner, &parsed.candidates)
            .map_err(|e| IngestError::Store(format!("{e:#}")))?;

        info!(
            "Imported statement for {}: {} parsed, {} saved, {} duplicates, {} rows skipped",
            owner,
            parsed.candidates.len(),
            saved.saved,
            saved.skipped,
            parsed.discarded()
        );

        Ok(UploadReport {
            total_parsed: parsed.candidates.len(),
            saved_count: saved.saved,
            duplicates: saved.skipped,
            skipped_rows: parsed.discarded(),
            errors: parsed.error_messages(MAX_REPORTED_ERRORS),
        })
    }
}
