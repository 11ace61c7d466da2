//! Tool catalogue: names, descriptions, and input contracts.

use serde_json::json;

use crate::config::MAX_RESULTS_LIMIT;
use crate::protocol::ToolDescriptor;
use crate::schema::{SchemaError, ToolContract};

pub const SEARCH_TOOL: &str = "search_knowledge_base";
pub const GET_DOCUMENT_TOOL: &str = "get_document";
pub const LIST_CATEGORIES_TOOL: &str = "list_categories";

/// Maximum accepted query length, in characters.
pub const MAX_QUERY_CHARS: usize = 500;

const SEARCH_DESCRIPTION: &str = "\
Search the knowledge base for relevant documentation and best practices.

Matches the query against titles, content, tags, and categories and returns \
documents ranked by relevance.

When to use:
- Finding best practices for a technology or pattern
- Looking up documentation on a specific topic
- Discovering related content by keyword

Returns a ranked list with title, ID, category, tags, and either a one-line \
summary (detail_level=concise) or the full content (detail_level=detailed). \
An empty match produces a 'no documents found' message with suggestions.";

const GET_DOCUMENT_DESCRIPTION: &str = "\
Retrieve a single document by its unique identifier.

When to use:
- After obtaining a document ID from search results
- When a specific document is referenced by ID
- To read the complete content of one document

Returns the full document. An unknown ID produces a 'document not found' \
message suggesting a search instead.";

const LIST_CATEGORIES_DESCRIPTION: &str = "\
List every documentation category with its document count.

When to use:
- To learn what topics the knowledge base covers
- Before running a category-filtered search

Returns category names in alphabetical order and the total document count.";

/// The three tools this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Search,
    GetDocument,
    ListCategories,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [Self::Search, Self::GetDocument, Self::ListCategories];

    pub fn name(self) -> &'static str {
        match self {
            Self::Search => SEARCH_TOOL,
            Self::GetDocument => GET_DOCUMENT_TOOL,
            Self::ListCategories => LIST_CATEGORIES_TOOL,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    fn description(self) -> &'static str {
        match self {
            Self::Search => SEARCH_DESCRIPTION,
            Self::GetDocument => GET_DOCUMENT_DESCRIPTION,
            Self::ListCategories => LIST_CATEGORIES_DESCRIPTION,
        }
    }

    /// JSON Schema for this tool's arguments.
    ///
    /// `default_max_results` is the configured fallback for searches.
    pub fn input_schema(self, default_max_results: u8) -> serde_json::Value {
        match self {
            Self::Search => json!({
                "type": "object",
                "required": ["query"],
                "additionalProperties": false,
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Keywords or a phrase to search for",
                        "minLength": 1,
                        "maxLength": MAX_QUERY_CHARS
                    },
                    "category": {
                        "type": ["string", "null"],
                        "description": "Optional exact category filter (case-insensitive), e.g. security, architecture, database, devops"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of results to return",
                        "minimum": 1,
                        "maximum": MAX_RESULTS_LIMIT,
                        "default": default_max_results
                    },
                    "format": format_schema(),
                    "detail_level": {
                        "type": "string",
                        "enum": ["concise", "detailed"],
                        "description": "'concise' for one-line summaries, 'detailed' for full content",
                        "default": "concise"
                    }
                }
            }),
            Self::GetDocument => json!({
                "type": "object",
                "required": ["document_id"],
                "additionalProperties": false,
                "properties": {
                    "document_id": {
                        "type": "string",
                        "description": "Unique document identifier, e.g. doc-001",
                        "minLength": 1
                    },
                    "format": format_schema()
                }
            }),
            Self::ListCategories => json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "format": format_schema()
                }
            }),
        }
    }
}

fn format_schema() -> serde_json::Value {
    json!({
        "type": "string",
        "enum": ["json", "markdown"],
        "description": "'json' for structured data, 'markdown' for human-readable text",
        "default": "markdown"
    })
}

/// Compiled contracts for every tool, built once at startup.
#[derive(Debug)]
pub struct ToolRegistry {
    contracts: Vec<(ToolKind, ToolContract)>,
}

impl ToolRegistry {
    pub fn new(default_max_results: u8) -> Result<Self, SchemaError> {
        let contracts = ToolKind::ALL
            .into_iter()
            .map(|tool| {
                ToolContract::compile(tool.name(), tool.input_schema(default_max_results))
                    .map(|contract| (tool, contract))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { contracts })
    }

    pub fn contract(&self, tool: ToolKind) -> Option<&ToolContract> {
        self.contracts
            .iter()
            .find(|(kind, _)| *kind == tool)
            .map(|(_, contract)| contract)
    }

    /// Descriptors in a fixed order for `tools/list`.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.contracts
            .iter()
            .map(|(tool, contract)| ToolDescriptor {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: contract.schema().clone(),
            })
            .collect()
    }
}
