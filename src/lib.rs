//! MCP server for a read-only knowledge base.
//!
//! Exposes `search_knowledge_base`, `get_document`, and `list_categories`
//! tools over JSON-RPC 2.0 stdio transport, compatible with any MCP-aware
//! AI agent. Search ranks documents with a literal, case-insensitive
//! substring score and renders results as JSON or Markdown under a fixed
//! character budget.

pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod render;
pub mod schema;
pub mod scoring;
pub mod server;
pub mod store;
pub mod tools;
