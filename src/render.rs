//! Response rendering and the truncation guard.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{CategorySummary, ScoredDocument, SearchQuery};
use crate::store::Document;

/// Default character budget for a rendered response.
pub const DEFAULT_CHARACTER_LIMIT: usize = 25_000;

/// Room reserved at the end of a truncated response for the marker.
pub const TRUNCATION_MARGIN: usize = 50;

pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated to fit context limit]";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderConfigError {
    #[error("character limit {limit} must exceed the truncation margin {margin}")]
    LimitTooSmall { limit: usize, margin: usize },
    #[error("truncation margin {margin} cannot hold the {marker}-char truncation marker")]
    MarginTooSmall { margin: usize, marker: usize },
}

/// Output encoding requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Structured output.
    Json,
    /// Human-readable output.
    #[default]
    Markdown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// First non-blank line of content only.
    #[default]
    Concise,
    /// Full content.
    Detailed,
}

/// Budget applied by [`Renderer::truncate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    character_limit: usize,
    margin: usize,
}

impl RenderConfig {
    pub fn new(character_limit: usize, margin: usize) -> Result<Self, RenderConfigError> {
        let marker = TRUNCATION_MARKER.chars().count();
        if margin < marker {
            return Err(RenderConfigError::MarginTooSmall { margin, marker });
        }
        if character_limit <= margin {
            return Err(RenderConfigError::LimitTooSmall {
                limit: character_limit,
                margin,
            });
        }
        Ok(Self {
            character_limit,
            margin,
        })
    }

    pub fn character_limit(&self) -> usize {
        self.character_limit
    }

    pub fn margin(&self) -> usize {
        self.margin
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            character_limit: DEFAULT_CHARACTER_LIMIT,
            margin: TRUNCATION_MARGIN,
        }
    }
}

#[derive(Debug, Serialize)]
struct DocumentView<'a> {
    id: &'a str,
    title: &'a str,
    category: &'a str,
    tags: &'a [String],
    updated: &'a str,
    content: &'a str,
}

impl<'a> DocumentView<'a> {
    fn new(doc: &'a Document, detail: DetailLevel) -> Self {
        Self {
            id: &doc.id,
            title: &doc.title,
            category: &doc.category,
            tags: &doc.tags,
            updated: &doc.updated,
            content: content_for(doc, detail),
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchPayload<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    max_results: usize,
    detail_level: DetailLevel,
    results_count: usize,
    documents: Vec<DocumentView<'a>>,
}

#[derive(Debug, Serialize)]
struct CategoriesPayload<'a> {
    categories: &'a [crate::engine::CategoryCount],
    total_categories: usize,
    total_documents: usize,
}

/// Turns engine output into bounded response text.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn render_search(
        &self,
        request: &SearchQuery,
        results: &[ScoredDocument<'_>],
        format: ResponseFormat,
        detail: DetailLevel,
    ) -> Result<String, RenderError> {
        let text = match format {
            ResponseFormat::Json => {
                let payload = SearchPayload {
                    query: &request.query,
                    category: active_category(request),
                    max_results: request.max_results,
                    detail_level: detail,
                    results_count: results.len(),
                    documents: results
                        .iter()
                        .map(|hit| DocumentView::new(hit.document, detail))
                        .collect(),
                };
                serde_json::to_string_pretty(&payload)?
            }
            ResponseFormat::Markdown => {
                let mut lines = vec![format!("# Search Results for: {}", request.query)];
                if let Some(category) = active_category(request) {
                    lines.push(format!("Category: {category}"));
                }
                lines.push(format!("Found {} relevant document(s)", results.len()));
                lines.push(String::new());

                for (i, hit) in results.iter().enumerate() {
                    lines.push(format!("### Result {}", i + 1));
                    lines.push(document_markdown(hit.document, detail));
                    lines.push(String::new());
                }
                lines.join("\n")
            }
        };
        Ok(self.truncate(text))
    }

    /// Explanatory text for a search that matched nothing.
    pub fn render_no_results(&self, request: &SearchQuery) -> String {
        let mut text = format!("No documents found matching query: '{}'", request.query);
        if let Some(category) = active_category(request) {
            text.push_str(&format!(" in category '{category}'"));
        }
        text.push_str(
            "\n\nTry:\n- Using different keywords\n- Removing the category filter\n- Using broader search terms",
        );
        self.truncate(text)
    }

    /// Full rendering of a single document.
    pub fn render_document(
        &self,
        doc: &Document,
        format: ResponseFormat,
    ) -> Result<String, RenderError> {
        let text = match format {
            ResponseFormat::Json => serde_json::to_string_pretty(doc)?,
            ResponseFormat::Markdown => document_markdown(doc, DetailLevel::Detailed),
        };
        Ok(self.truncate(text))
    }

    pub fn render_not_found(&self, document_id: &str) -> String {
        let text = format!(
            "Document not found: {document_id}\n\n\
             This document ID does not exist in the knowledge base.\n\
             Try using 'search_knowledge_base' to find relevant documents."
        );
        self.truncate(text)
    }

    pub fn render_categories(
        &self,
        summary: &CategorySummary,
        format: ResponseFormat,
    ) -> Result<String, RenderError> {
        let text = match format {
            ResponseFormat::Json => {
                let payload = CategoriesPayload {
                    categories: &summary.categories,
                    total_categories: summary.categories.len(),
                    total_documents: summary.total_documents,
                };
                serde_json::to_string_pretty(&payload)?
            }
            ResponseFormat::Markdown => {
                let mut lines = vec![
                    "# Knowledge Base Categories".to_string(),
                    format!("Total documents: {}", summary.total_documents),
                    String::new(),
                ];
                for category in &summary.categories {
                    lines.push(format!(
                        "- **{}**: {} document(s)",
                        category.name, category.document_count
                    ));
                }
                lines.join("\n")
            }
        };
        Ok(self.truncate(text))
    }

    /// Cap `text` at the character budget.
    ///
    /// Text within budget is returned unchanged. Otherwise it is cut to
    /// `limit - margin` chars and the truncation marker is appended, which
    /// always fits inside the margin.
    pub fn truncate(&self, text: String) -> String {
        let limit = self.config.character_limit;
        // Byte length bounds char count from above.
        if text.len() <= limit || text.chars().count() <= limit {
            return text;
        }

        let keep = limit - self.config.margin;
        let cut = text
            .char_indices()
            .nth(keep)
            .map(|(idx, _)| idx)
            .unwrap_or(text.len());

        tracing::debug!(
            original_chars = text.chars().count(),
            limit,
            "response truncated"
        );

        let mut out = String::with_capacity(cut + TRUNCATION_MARKER.len());
        out.push_str(&text[..cut]);
        out.push_str(TRUNCATION_MARKER);
        out
    }
}

fn active_category(request: &SearchQuery) -> Option<&str> {
    request.category.as_deref().filter(|c| !c.is_empty())
}

fn content_for(doc: &Document, detail: DetailLevel) -> &str {
    match detail {
        DetailLevel::Detailed => doc.content.trim(),
        DetailLevel::Concise => doc.summary(),
    }
}

fn document_markdown(doc: &Document, detail: DetailLevel) -> String {
    let mut lines = vec![
        format!("## {}", doc.title),
        format!("**ID:** {}", doc.id),
        format!("**Category:** {}", doc.category),
        format!("**Tags:** {}", doc.tags.join(", ")),
        format!("**Last Updated:** {}", doc.updated),
        String::new(),
    ];

    match detail {
        DetailLevel::Detailed => {
            lines.push("### Content".to_string());
            lines.push(doc.content.trim().to_string());
        }
        DetailLevel::Concise => {
            lines.push(format!("**Summary:** {}", doc.summary()));
        }
    }

    lines.join("\n")
}
