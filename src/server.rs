use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::handlers::{self, ToolDispatcher};
use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};

/// Maximum bytes per JSON-RPC message (1 MiB).
const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// MCP server that communicates over stdio using newline-delimited JSON-RPC 2.0.
pub struct McpServer {
    tools: ToolDispatcher,
    initialized: bool,
}

impl McpServer {
    pub fn new(tools: ToolDispatcher) -> Self {
        Self {
            tools,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);
        let mut raw = Vec::new();

        tracing::info!("Listening for JSON-RPC messages on stdin");

        loop {
            raw.clear();
            let n = reader.read_until(b'\n', &mut raw).await?;
            if n == 0 {
                break;
            }

            if let Some(resp) = self.handle_frame(&raw).await {
                write_response(&mut stdout, &resp).await?;
            }
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Process one newline-delimited frame.
    ///
    /// Returns `None` when nothing should be written back (blank lines,
    /// notifications, pre-handshake notifications).
    pub async fn handle_frame(&mut self, raw: &[u8]) -> Option<JsonRpcResponse> {
        if raw.len() > MAX_MESSAGE_BYTES {
            tracing::warn!(
                "Message too large: {} bytes (limit {MAX_MESSAGE_BYTES})",
                raw.len()
            );
            return Some(JsonRpcResponse::error(None, JsonRpcError::parse_error()));
        }

        let Ok(text) = std::str::from_utf8(raw) else {
            tracing::warn!("Message is not valid UTF-8");
            return Some(JsonRpcResponse::error(None, JsonRpcError::parse_error()));
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let req: JsonRpcRequest = match serde_json::from_str(trimmed) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Parse error: {e}");
                return Some(JsonRpcResponse::error(None, JsonRpcError::parse_error()));
            }
        };

        if req.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                req.id.clone(),
                JsonRpcError::invalid_request(),
            ));
        }

        // Only `initialize` is accepted before the handshake
        if !self.initialized && req.method != "initialize" {
            return req.id.clone().map(|id| {
                JsonRpcResponse::error(
                    Some(id),
                    JsonRpcError::invalid_request_with("Server not initialized"),
                )
            });
        }

        let resp = handlers::dispatch(&req, &self.tools).await;

        if req.method == "initialize" && !self.initialized {
            tracing::info!("Handshake complete");
            self.initialized = true;
        }

        resp
    }
}

async fn write_response(
    stdout: &mut tokio::io::Stdout,
    resp: &JsonRpcResponse,
) -> Result<(), Box<dyn std::error::Error>> {
    let out = serde_json::to_string(resp)?;
    stdout.write_all(out.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}
