use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seed collection compiled into the binary.
const SEED_JSON: &str = include_str!("../data/knowledge_base.json");

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Cannot read document file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid document JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Document '{id}' has empty content")]
    EmptyContent { id: String },
    #[error("Document '{id}' has invalid {field} date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate {
        id: String,
        field: &'static str,
        value: String,
    },
}

/// One knowledge-base article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub category: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created: String,
    pub updated: String,
}

impl Document {
    /// First non-blank line of the content, trimmed.
    pub fn summary(&self) -> &str {
        self.content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("")
    }
}

/// Immutable, read-only document collection.
///
/// Built once at startup; no mutation API exists. Insertion order is
/// preserved and is the tie-break order for ranking.
#[derive(Debug)]
pub struct DocumentStore {
    documents: Vec<Document>,
    by_id: HashMap<String, usize>,
}

impl DocumentStore {
    /// Build a store, validating every document.
    ///
    /// Duplicate ids are tolerated: the first one inserted wins lookups.
    pub fn new(documents: Vec<Document>) -> Result<Self, StoreError> {
        let mut by_id = HashMap::with_capacity(documents.len());

        for (idx, doc) in documents.iter().enumerate() {
            if doc.content.trim().is_empty() {
                return Err(StoreError::EmptyContent { id: doc.id.clone() });
            }
            check_date(&doc.id, "created", &doc.created)?;
            check_date(&doc.id, "updated", &doc.updated)?;

            if by_id.contains_key(&doc.id) {
                tracing::warn!(id = %doc.id, "duplicate document id; keeping first occurrence");
                continue;
            }
            by_id.insert(doc.id.clone(), idx);
        }

        Ok(Self { documents, by_id })
    }

    /// Store holding the built-in seed collection.
    pub fn seed() -> Result<Self, StoreError> {
        Self::from_json(SEED_JSON)
    }

    /// Parse a JSON array of documents.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let documents: Vec<Document> = serde_json::from_str(json)?;
        Self::new(documents)
    }

    /// Read a JSON array of documents from disk.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// All documents in insertion order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.by_id.get(id).map(|&idx| &self.documents[idx])
    }

    /// Distinct category names, sorted ascending.
    pub fn categories(&self) -> Vec<&str> {
        self.documents
            .iter()
            .map(|doc| doc.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn check_date(id: &str, field: &'static str, value: &str) -> Result<(), StoreError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| StoreError::InvalidDate {
            id: id.to_string(),
            field,
            value: value.to_string(),
        })
}
