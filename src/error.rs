use thiserror::Error;

use crate::protocol::ToolResult;
use crate::render::{RenderError, Renderer};

/// Failure of a single tool invocation.
///
/// Every variant ends up as a tool result with `isError: true`; none of
/// them terminates the server.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for tool '{tool}': {}", .violations.join("; "))]
    InvalidArguments {
        tool: String,
        violations: Vec<String>,
    },

    /// `reason` is short and safe to show; details are logged only.
    #[error("Error executing tool '{tool}': internal error ({reason})")]
    Internal { tool: String, reason: &'static str },
}

impl ToolError {
    pub fn internal(tool: &str, reason: &'static str) -> Self {
        Self::Internal {
            tool: tool.to_string(),
            reason,
        }
    }

    pub fn from_render(tool: &str, err: RenderError) -> Self {
        tracing::error!(tool, error = %err, "rendering failed");
        Self::internal(tool, "failed to render response")
    }

    /// User-facing text for the error envelope.
    pub fn message(&self) -> String {
        match self {
            Self::InvalidArguments { tool, violations } => {
                let mut text = format!("Invalid arguments for tool '{tool}':\n");
                for violation in violations {
                    text.push_str(&format!("- {violation}\n"));
                }
                text.push_str(
                    "\nPlease check:\n\
                     - All required parameters are provided\n\
                     - Parameter types and values are correct\n\
                     - Parameter values are within allowed ranges",
                );
                text
            }
            other => other.to_string(),
        }
    }

    /// Error envelope for the client, bounded by the response budget.
    pub fn into_result(self, renderer: &Renderer) -> ToolResult {
        ToolResult::error(renderer.truncate(self.message()))
    }
}
