//! ledgerlens-ingest: statement ingestion (CSV and PDF text) into transaction candidates.

pub mod columns;
pub mod decode;
pub mod error;
pub mod normalize;
pub mod parsers;
pub mod statement;
pub mod types;

pub use error::{IngestError, Result};
pub use statement::StatementParser;
pub use types::{ParseOutput, RowOutcome, SkipReason, SkippedRow, StatementFormat, UploadReport};
