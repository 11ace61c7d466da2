use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::scoring;
use crate::store::{Document, DocumentStore};

/// A validated search request as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    /// Exact (case-insensitive) category filter.
    pub category: Option<String>,
    pub max_results: usize,
}

/// A document paired with its relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredDocument<'a> {
    pub document: &'a Document,
    pub score: u32,
}

/// Outcome of a by-id lookup. A missing document is an expected result,
/// not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(&'a Document),
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub document_count: usize,
}

/// Per-category document counts, recomputed on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub categories: Vec<CategoryCount>,
    pub total_documents: usize,
}

/// Read-only query layer over a shared [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct QueryEngine {
    store: Arc<DocumentStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Rank documents against a query.
    ///
    /// Results are sorted by descending score; equal scores keep store
    /// order. Zero-score documents are dropped. An empty vector is a
    /// normal outcome.
    pub fn search(&self, request: &SearchQuery) -> Vec<ScoredDocument<'_>> {
        let category = request
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(str::to_lowercase);

        let mut results: Vec<ScoredDocument<'_>> = self
            .store
            .documents()
            .iter()
            .filter(|doc| match &category {
                Some(wanted) => doc.category.to_lowercase() == *wanted,
                None => true,
            })
            .map(|doc| ScoredDocument {
                document: doc,
                score: scoring::score(doc, &request.query),
            })
            .filter(|hit| hit.score > 0)
            .collect();

        // sort_by is stable, so ties preserve store order
        results.sort_by(|a, b| b.score.cmp(&a.score));
        results.truncate(request.max_results);
        results
    }

    pub fn get_by_id(&self, id: &str) -> Lookup<'_> {
        match self.store.get(id) {
            Some(doc) => Lookup::Found(doc),
            None => Lookup::NotFound,
        }
    }

    /// Category names (ascending) with their document counts.
    pub fn list_categories(&self) -> CategorySummary {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for doc in self.store.documents() {
            *counts.entry(doc.category.as_str()).or_insert(0) += 1;
        }

        CategorySummary {
            categories: counts
                .into_iter()
                .map(|(name, document_count)| CategoryCount {
                    name: name.to_string(),
                    document_count,
                })
                .collect(),
            total_documents: self.store.len(),
        }
    }
}
