use crate::error::ToolError;
use crate::protocol::{ListCategoriesParams, ToolResult};
use crate::tools::LIST_CATEGORIES_TOOL;

use super::ToolContext;

/// Handle a `list_categories` tool call.
///
/// Counts are recomputed from the store on every call.
pub fn handle(params: ListCategoriesParams, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
    let summary = ctx.engine.list_categories();
    let text = ctx
        .renderer
        .render_categories(&summary, params.format)
        .map_err(|e| ToolError::from_render(LIST_CATEGORIES_TOOL, e))?;
    Ok(ToolResult::text(text))
}
