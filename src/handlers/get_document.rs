use crate::engine::Lookup;
use crate::error::ToolError;
use crate::protocol::{GetDocumentParams, ToolResult};
use crate::tools::GET_DOCUMENT_TOOL;

use super::ToolContext;

/// Handle a `get_document` tool call.
pub fn handle(params: GetDocumentParams, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
    match ctx.engine.get_by_id(&params.document_id) {
        Lookup::Found(doc) => {
            let text = ctx
                .renderer
                .render_document(doc, params.format)
                .map_err(|e| ToolError::from_render(GET_DOCUMENT_TOOL, e))?;
            Ok(ToolResult::text(text))
        }
        Lookup::NotFound => {
            tracing::debug!(document_id = %params.document_id, "document not found");
            Ok(ToolResult::text(
                ctx.renderer.render_not_found(&params.document_id),
            ))
        }
    }
}
