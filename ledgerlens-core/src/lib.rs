//! ledgerlens-core: transaction model, categorization and storage contracts

pub mod categorizer;
pub mod finance;
pub mod store;

pub use categorizer::{
    Categorizer, ClassifyError, Classifier, KeywordTable, UnavailableClassifier, FALLBACK_CATEGORY,
};
pub use finance::{DedupKey, Transaction, TransactionCandidate, TxnType};
pub use store::{MemoryStore, SaveOutcome, TransactionStore};
