use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::render::{DetailLevel, ResponseFormat};

/// JSON-RPC 2.0 ID: a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(i64),
    Str(String),
}

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<RpcId>,
    pub method: String,
    pub params: Option<serde_json::Value>,
}

/// Arguments for the `search_knowledge_base` tool.
///
/// Bounds are enforced by the tool's JSON Schema before deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchParams {
    pub query: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Falls back to the configured default when omitted.
    #[serde(default, deserialize_with = "deserialize_max_results")]
    pub max_results: Option<u8>,
    #[serde(default)]
    pub format: ResponseFormat,
    #[serde(default)]
    pub detail_level: DetailLevel,
}

/// Accepts any JSON number with an integral value, so `5.0` reads as `5`.
///
/// JSON Schema treats `5.0` as an integer; serde's `u8` does not.
fn deserialize_max_results<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let whole = match number.as_u64() {
        Some(n) => Some(n),
        None => number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u8::MAX))
            .map(|f| f as u64),
    };
    whole
        .and_then(|n| u8::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("max_results must be a whole number, got {number}")))
}

/// Arguments for the `get_document` tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetDocumentParams {
    pub document_id: String,
    #[serde(default)]
    pub format: ResponseFormat,
}

/// Arguments for the `list_categories` tool.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListCategoriesParams {
    #[serde(default)]
    pub format: ResponseFormat,
}

/// MCP `initialize` params.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: Option<String>,
    #[serde(rename = "clientInfo")]
    pub client_info: Option<ClientInfo>,
}

/// Client information sent during `initialize`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// Parameters for `tools/call`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}
