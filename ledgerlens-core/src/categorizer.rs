//! Categorizing transaction descriptions.
//!
//! A [`Classifier`] (usually a trained model behind an HTTP endpoint) is tried
//! first. When it is missing, errors, or returns a blank label, the ordered
//! [`KeywordTable`] decides.

use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Label used when no keyword matches
pub const FALLBACK_CATEGORY: &str = "other";

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("classifier unavailable")]
    Unavailable,

    #[error("classifier request failed: {0}")]
    Request(String),

    #[error("classifier returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// External text classifier: description in, category label out.
///
/// Implementations are shared across uploads and must be safe for
/// concurrent read-only use.
pub trait Classifier: Send + Sync {
    fn classify(&self, description: &str) -> Result<String, ClassifyError>;
}

/// Stand-in used when no classifier is configured; always fails so the
/// keyword table is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableClassifier;

impl Classifier for UnavailableClassifier {
    fn classify(&self, _description: &str) -> Result<String, ClassifyError> {
        Err(ClassifyError::Unavailable)
    }
}

/// Ordered `(category, keywords)` pairs. The first category with a keyword
/// contained in the description wins.
///
/// Matching is case-insensitive and treats punctuation as spaces, with a
/// space added at each end of the description. A keyword written with
/// surrounding spaces (`" rent "`) therefore matches only the whole word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    entries: Vec<(String, Vec<String>)>,
}

impl KeywordTable {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Append a category. Keywords are stored folded the same way
    /// descriptions are, edge spaces kept.
    pub fn with_category(mut self, category: &str, keywords: &[&str]) -> Self {
        self.entries.push((
            category.to_string(),
            keywords.iter().map(|k| fold(k)).collect(),
        ));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    /// Keyword lookup, `other` when nothing matches.
    pub fn lookup(&self, description: &str) -> &str {
        let desc = format!(" {} ", fold(description).trim());
        self.entries
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| desc.contains(k.as_str())))
            .map(|(category, _)| category.as_str())
            .unwrap_or(FALLBACK_CATEGORY)
    }
}

/// Lowercase, every run of non-alphanumeric characters collapsed to one space.
fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            out.push(ch);
        } else if !out.ends_with(' ') {
            out.push(' ');
        }
    }
    out
}

impl Default for KeywordTable {
    /// Built-in table. Short words that hide inside longer ones ("ola",
    /// "rent") are whole-word keywords.
    fn default() -> Self {
        KeywordTable::new()
            .with_category("salary", &["salary", "payroll", "stipend"])
            .with_category(
                "food_dining",
                &[
                    "zomato", "swiggy", "restaurant", "cafe", "coffee", "starbucks",
                    "domino", "pizza", "mcdonald", "kfc", "burger", "food",
                ],
            )
            .with_category(
                "groceries",
                &["grocery", "bigbasket", "blinkit", "zepto", "dmart", "supermarket", "mart"],
            )
            .with_category(
                "transport",
                &["uber", " ola ", "rapido", "metro", "irctc", "petrol", "fuel", "parking", "toll"],
            )
            .with_category(
                "entertainment",
                &["netflix", "spotify", "hotstar", "prime video", "bookmyshow", "movie", "cinema"],
            )
            .with_category("shopping", &["amazon", "flipkart", "myntra", "ajio", "nykaa"])
            .with_category(
                "utilities",
                &["electricity", "broadband", "recharge", "airtel", "jio", "water bill", "gas bill"],
            )
            .with_category("health", &["pharmacy", "hospital", "clinic", "apollo", "medical"])
            .with_category("education", &["tuition", "school", "college", "course", "udemy"])
            .with_category("rent", &[" rent ", "landlord"])
    }
}

/// Classifier with keyword fallback. Cheap to clone; the classifier is shared.
#[derive(Clone)]
pub struct Categorizer {
    classifier: Option<Arc<dyn Classifier>>,
    table: KeywordTable,
}

impl Categorizer {
    pub fn new(classifier: Arc<dyn Classifier>, table: KeywordTable) -> Self {
        Self {
            classifier: Some(classifier),
            table,
        }
    }

    /// Keyword table only
    pub fn keywords_only(table: KeywordTable) -> Self {
        Self {
            classifier: None,
            table,
        }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    /// Never fails: classifier errors fall back to the keyword table.
    pub fn categorize(&self, description: &str) -> String {
        if let Some(classifier) = &self.classifier {
            match classifier.classify(description) {
                Ok(label) if !label.trim().is_empty() => return label.trim().to_string(),
                Ok(_) => debug!("classifier returned a blank label, using keyword table"),
                Err(e) => debug!("classifier failed ({e}), using keyword table"),
            }
        }
        self.table.lookup(description).to_string()
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::keywords_only(KeywordTable::default())
    }
}

impl std::fmt::Debug for Categorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Categorizer")
            .field("has_classifier", &self.classifier.is_some())
            .field("table", &self.table)
            .finish()
    }
}
