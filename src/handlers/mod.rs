pub mod get_document;
pub mod list_categories;
pub mod search;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ServerConfig;
use crate::engine::QueryEngine;
use crate::error::ToolError;
use crate::protocol::{
    InitializeParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams,
    ToolDescriptor, ToolResult,
};
use crate::render::Renderer;
use crate::schema::SchemaError;
use crate::store::DocumentStore;
use crate::tools::{ToolKind, ToolRegistry};

/// Read-only state shared by every tool handler.
#[derive(Debug)]
pub struct ToolContext {
    pub engine: QueryEngine,
    pub renderer: Renderer,
    pub default_max_results: u8,
}

/// Validates tool invocations and routes them to their handlers.
///
/// Holds no mutable state, so calls may run concurrently.
#[derive(Debug)]
pub struct ToolDispatcher {
    registry: ToolRegistry,
    context: Arc<ToolContext>,
    tool_timeout: Duration,
}

impl ToolDispatcher {
    pub fn new(store: Arc<DocumentStore>, config: &ServerConfig) -> Result<Self, SchemaError> {
        Ok(Self {
            registry: ToolRegistry::new(config.default_max_results)?,
            context: Arc::new(ToolContext {
                engine: QueryEngine::new(store),
                renderer: Renderer::new(config.render),
                default_max_results: config.default_max_results,
            }),
            tool_timeout: config.tool_timeout,
        })
    }

    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.registry.descriptors()
    }

    /// Run one tool invocation to completion.
    ///
    /// Always yields a tool result: validation failures, unknown tools,
    /// panics, and timeouts all become `isError` responses. Every result,
    /// error text included, passes through the truncation guard.
    pub async fn call_tool(&self, name: &str, arguments: Option<Value>) -> ToolResult {
        match self.try_call_tool(name, arguments).await {
            Ok(result) => result,
            Err(err) => err.into_result(&self.context.renderer),
        }
    }

    async fn try_call_tool(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<ToolResult, ToolError> {
        let Some(tool) = ToolKind::from_name(name) else {
            tracing::debug!(tool_len = name.len(), "unknown tool requested");
            return Err(ToolError::UnknownTool(name.to_string()));
        };

        let Some(contract) = self.registry.contract(tool) else {
            tracing::error!(tool = name, "no input contract registered");
            return Err(ToolError::internal(name, "tool is not configured"));
        };

        // Missing arguments mean "all defaults".
        let arguments = arguments.unwrap_or_else(|| Value::Object(Default::default()));
        if let Err(violations) = contract.validate(&arguments) {
            tracing::debug!(tool = name, count = violations.len(), "arguments rejected");
            return Err(ToolError::InvalidArguments {
                tool: name.to_string(),
                violations,
            });
        }

        tracing::debug!(tool = name, "dispatching tool call");
        self.execute_guarded(tool.name(), move |ctx| run_tool(tool, arguments, ctx))
            .await
    }

    /// Run `job` on the blocking pool under the tool timeout.
    ///
    /// A panic or an expired timeout inside `job` becomes an internal
    /// error for `tool`; the dispatcher stays usable afterwards.
    pub async fn execute_guarded<F>(&self, tool: &str, job: F) -> Result<ToolResult, ToolError>
    where
        F: FnOnce(&ToolContext) -> Result<ToolResult, ToolError> + Send + 'static,
    {
        let context = Arc::clone(&self.context);
        let task = tokio::task::spawn_blocking(move || job(&context));

        match tokio::time::timeout(self.tool_timeout, task).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_err)) => {
                tracing::error!(tool, error = %join_err, "tool task failed");
                let reason = if join_err.is_panic() {
                    "handler panicked"
                } else {
                    "handler was cancelled"
                };
                Err(ToolError::internal(tool, reason))
            }
            Err(_) => {
                tracing::error!(
                    tool,
                    "tool call timed out after {} ms",
                    self.tool_timeout.as_millis()
                );
                Err(ToolError::internal(tool, "timed out"))
            }
        }
    }
}

fn run_tool(tool: ToolKind, arguments: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
    match tool {
        ToolKind::Search => search::handle(parse_arguments(tool, arguments)?, ctx),
        ToolKind::GetDocument => get_document::handle(parse_arguments(tool, arguments)?, ctx),
        ToolKind::ListCategories => {
            list_categories::handle(parse_arguments(tool, arguments)?, ctx)
        }
    }
}

/// Decode arguments that already passed schema validation.
///
/// A failure here means the schema and the typed params disagree.
fn parse_arguments<T: DeserializeOwned>(tool: ToolKind, arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| {
        tracing::error!(tool = tool.name(), error = %e, "validated arguments failed to decode");
        ToolError::internal(tool.name(), "argument decoding failed")
    })
}

/// Dispatch a JSON-RPC request to the appropriate handler.
///
/// Returns `None` for notifications (no response required).
pub async fn dispatch(
    req: &JsonRpcRequest,
    tools: &ToolDispatcher,
) -> Option<JsonRpcResponse> {
    match req.method.as_str() {
        "initialize" => {
            if let Some(params) = req
                .params
                .as_ref()
                .and_then(|v| serde_json::from_value::<InitializeParams>(v.clone()).ok())
            {
                let client = params.client_info.as_ref();
                tracing::info!(
                    protocol_version = ?params.protocol_version,
                    client_name = ?client.and_then(|c| c.name.as_deref()),
                    client_version = ?client.and_then(|c| c.version.as_deref()),
                    "client initializing"
                );
            }

            let result = serde_json::json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "mcp-knowledge-server",
                    "version": env!("CARGO_PKG_VERSION")
                }
            });
            Some(JsonRpcResponse::success(req.id.clone(), result))
        }

        "notifications/initialized" => None,

        "ping" => Some(JsonRpcResponse::success(req.id.clone(), serde_json::json!({}))),

        "tools/list" => {
            let result = serde_json::json!({ "tools": tools.list_tools() });
            Some(JsonRpcResponse::success(req.id.clone(), result))
        }

        "tools/call" => {
            let params: ToolCallParams = match &req.params {
                Some(v) => match serde_json::from_value(v.clone()) {
                    Ok(p) => p,
                    Err(e) => {
                        return Some(JsonRpcResponse::error(
                            req.id.clone(),
                            JsonRpcError::invalid_params(format!(
                                "Invalid tools/call params: {e}"
                            )),
                        ));
                    }
                },
                None => {
                    return Some(JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::invalid_params("Missing params for tools/call"),
                    ));
                }
            };

            let tool_result = tools.call_tool(&params.name, params.arguments).await;
            match serde_json::to_value(&tool_result) {
                Ok(result_json) => Some(JsonRpcResponse::success(req.id.clone(), result_json)),
                Err(e) => {
                    tracing::error!(tool = %params.name, error = %e, "cannot serialize tool result");
                    Some(JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::internal_error("Internal error"),
                    ))
                }
            }
        }

        _ => Some(JsonRpcResponse::error(
            req.id.clone(),
            JsonRpcError::method_not_found(&req.method),
        )),
    }
}
