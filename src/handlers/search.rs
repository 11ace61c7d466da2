use crate::engine::SearchQuery;
use crate::error::ToolError;
use crate::protocol::{SearchParams, ToolResult};
use crate::tools::SEARCH_TOOL;

use super::ToolContext;

/// Handle a `search_knowledge_base` tool call.
///
/// No matches is a successful response carrying guidance, not an error.
pub fn handle(params: SearchParams, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
    let max_results = params.max_results.unwrap_or(ctx.default_max_results);
    let request = SearchQuery {
        query: params.query,
        category: params.category,
        max_results: usize::from(max_results),
    };

    let results = ctx.engine.search(&request);
    tracing::debug!(
        query = %request.query,
        category = ?request.category,
        hits = results.len(),
        "search executed"
    );

    if results.is_empty() {
        return Ok(ToolResult::text(ctx.renderer.render_no_results(&request)));
    }

    let text = ctx
        .renderer
        .render_search(&request, &results, params.format, params.detail_level)
        .map_err(|e| ToolError::from_render(SEARCH_TOOL, e))?;
    Ok(ToolResult::text(text))
}
