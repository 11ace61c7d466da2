//! Integration tests for the tool dispatcher and the JSON-RPC routing layer.
//!
//! Tests exercise `ToolDispatcher::call_tool` directly with a test config,
//! and verify the full dispatch flow for `tools/list` and `tools/call`.

use std::sync::Arc;
use std::time::Duration;

use mcp_knowledge_server::config::ServerConfig;
use mcp_knowledge_server::error::ToolError;
use mcp_knowledge_server::handlers::{self, ToolDispatcher};
use mcp_knowledge_server::protocol::{JsonRpcRequest, RpcId, ToolResult};
use mcp_knowledge_server::render::{
    RenderConfig, Renderer, DEFAULT_CHARACTER_LIMIT, TRUNCATION_MARKER,
};
use mcp_knowledge_server::store::DocumentStore;
use serde_json::json;

fn dispatcher_with(config: ServerConfig) -> ToolDispatcher {
    let store = Arc::new(DocumentStore::seed().unwrap());
    ToolDispatcher::new(store, &config).unwrap()
}

fn dispatcher() -> ToolDispatcher {
    dispatcher_with(ServerConfig::default())
}

// ---------------------------------------------------------------------------
// search_knowledge_base
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_defaults_to_markdown_concise() {
    let tools = dispatcher();
    let result = tools
        .call_tool("search_knowledge_base", Some(json!({ "query": "authentication" })))
        .await;

    assert!(!result.is_error);
    let text = result.text_content();
    assert!(text.starts_with("# Search Results for: authentication"));
    assert!(text.contains("## API Authentication Best Practices"));
    assert!(text.contains("**Summary:**"));
}

#[tokio::test]
async fn search_json_detailed() {
    let tools = dispatcher();
    let result = tools
        .call_tool(
            "search_knowledge_base",
            Some(json!({
                "query": "architecture",
                "max_results": 1,
                "format": "json",
                "detail_level": "detailed"
            })),
        )
        .await;

    assert!(!result.is_error);
    let value: serde_json::Value = serde_json::from_str(result.text_content()).unwrap();
    assert_eq!(value["results_count"], 1);
    assert_eq!(value["max_results"], 1);
    assert_eq!(value["documents"][0]["id"], "doc-004");
    assert!(value["documents"][0]["content"]
        .as_str()
        .unwrap()
        .contains("Ensuring event ordering when needed"));
}

#[tokio::test]
async fn search_uses_configured_default_max_results() {
    let config = ServerConfig {
        default_max_results: 1,
        ..ServerConfig::default()
    };
    let tools = dispatcher_with(config);
    let result = tools
        .call_tool(
            "search_knowledge_base",
            Some(json!({ "query": "a", "format": "json" })),
        )
        .await;

    let value: serde_json::Value = serde_json::from_str(result.text_content()).unwrap();
    assert_eq!(value["max_results"], 1);
    assert_eq!(value["results_count"], 1);
}

#[tokio::test]
async fn search_without_matches_is_not_an_error() {
    let tools = dispatcher();
    let result = tools
        .call_tool(
            "search_knowledge_base",
            Some(json!({ "query": "zzz-nonexistent-term", "max_results": 5 })),
        )
        .await;

    assert!(!result.is_error);
    assert!(result
        .text_content()
        .starts_with("No documents found matching query: 'zzz-nonexistent-term'"));
}

#[tokio::test]
async fn search_without_matches_in_category_suggests_removing_filter() {
    let tools = dispatcher();
    let result = tools
        .call_tool(
            "search_knowledge_base",
            Some(json!({ "query": "kubernetes", "category": "security" })),
        )
        .await;

    assert!(!result.is_error);
    let text = result.text_content();
    assert!(text.contains("in category 'security'"));
    assert!(text.contains("Removing the category filter"));
}

#[tokio::test]
async fn search_accepts_null_category() {
    let tools = dispatcher();
    let result = tools
        .call_tool(
            "search_knowledge_base",
            Some(json!({ "query": "redis", "category": null })),
        )
        .await;

    assert!(!result.is_error);
    assert!(result.text_content().contains("doc-003"));
}

#[tokio::test]
async fn max_results_out_of_range_rejected() {
    let tools = dispatcher();

    for bad in [0, 11, -3] {
        let result = tools
            .call_tool(
                "search_knowledge_base",
                Some(json!({ "query": "authentication", "max_results": bad })),
            )
            .await;
        assert!(result.is_error, "max_results={bad} should be rejected");
        assert!(result
            .text_content()
            .starts_with("Invalid arguments for tool 'search_knowledge_base'"));
        assert!(result.text_content().contains("Please check:"));
    }
}

#[tokio::test]
async fn integral_float_max_results_accepted() {
    let tools = dispatcher();
    let result = tools
        .call_tool(
            "search_knowledge_base",
            Some(json!({ "query": "api", "max_results": 2.0, "format": "json" })),
        )
        .await;

    assert!(!result.is_error, "{}", result.text_content());
    let value: serde_json::Value = serde_json::from_str(result.text_content()).unwrap();
    assert_eq!(value["max_results"], 2);
}

#[tokio::test]
async fn fractional_max_results_rejected() {
    let tools = dispatcher();
    let result = tools
        .call_tool(
            "search_knowledge_base",
            Some(json!({ "query": "api", "max_results": 2.5 })),
        )
        .await;

    assert!(result.is_error);
    assert!(result
        .text_content()
        .starts_with("Invalid arguments for tool 'search_knowledge_base'"));
}

#[tokio::test]
async fn query_length_bounds() {
    let tools = dispatcher();

    let empty = tools
        .call_tool("search_knowledge_base", Some(json!({ "query": "" })))
        .await;
    assert!(empty.is_error);

    let too_long = tools
        .call_tool(
            "search_knowledge_base",
            Some(json!({ "query": "q".repeat(501) })),
        )
        .await;
    assert!(too_long.is_error);

    let longest = tools
        .call_tool(
            "search_knowledge_base",
            Some(json!({ "query": "q".repeat(500) })),
        )
        .await;
    assert!(!longest.is_error);
}

#[tokio::test]
async fn invalid_argument_shapes_rejected() {
    let tools = dispatcher();

    let cases = vec![
        json!({}),
        json!({ "query": 42 }),
        json!({ "query": "api", "unexpected": true }),
        json!({ "query": "api", "format": "xml" }),
        json!({ "query": "api", "detail_level": "verbose" }),
        json!({ "query": "api", "max_results": "five" }),
        json!("just a string"),
    ];

    for args in cases {
        let result = tools
            .call_tool("search_knowledge_base", Some(args.clone()))
            .await;
        assert!(result.is_error, "arguments {args} should be rejected");
    }

    let missing = tools.call_tool("search_knowledge_base", None).await;
    assert!(missing.is_error, "search without arguments lacks a query");
}

#[tokio::test]
async fn unknown_field_is_named_in_message() {
    let tools = dispatcher();
    let result = tools
        .call_tool(
            "search_knowledge_base",
            Some(json!({ "query": "api", "limit": 3 })),
        )
        .await;

    assert!(result.is_error);
    assert!(result.text_content().contains("limit"));
}

// ---------------------------------------------------------------------------
// get_document
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_document_returns_full_markdown() {
    let tools = dispatcher();
    let result = tools
        .call_tool("get_document", Some(json!({ "document_id": "doc-001" })))
        .await;

    assert!(!result.is_error);
    let text = result.text_content();
    assert!(text.starts_with("## API Authentication Best Practices"));
    assert!(text.contains("### Content"));
    assert!(text.contains("Logging sensitive authentication data"));
}

#[tokio::test]
async fn get_document_json() {
    let tools = dispatcher();
    let result = tools
        .call_tool(
            "get_document",
            Some(json!({ "document_id": "doc-005", "format": "json" })),
        )
        .await;

    let value: serde_json::Value = serde_json::from_str(result.text_content()).unwrap();
    assert_eq!(value["id"], "doc-005");
    assert_eq!(value["category"], "devops");
    assert_eq!(value["created"], "2024-05-20");
}

#[tokio::test]
async fn get_document_missing_is_not_an_error() {
    let tools = dispatcher();
    let result = tools
        .call_tool("get_document", Some(json!({ "document_id": "doc-999" })))
        .await;

    assert!(!result.is_error);
    assert!(result.text_content().starts_with("Document not found: doc-999"));
}

#[tokio::test]
async fn get_document_is_idempotent() {
    let tools = dispatcher();
    let args = json!({ "document_id": "doc-002" });

    let a = tools.call_tool("get_document", Some(args.clone())).await;
    let b = tools.call_tool("get_document", Some(args)).await;
    assert_eq!(a.text_content(), b.text_content());
}

#[tokio::test]
async fn get_document_requires_id() {
    let tools = dispatcher();

    let missing = tools.call_tool("get_document", Some(json!({}))).await;
    assert!(missing.is_error);

    let empty = tools
        .call_tool("get_document", Some(json!({ "document_id": "" })))
        .await;
    assert!(empty.is_error);
}

// ---------------------------------------------------------------------------
// list_categories
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_categories_without_arguments() {
    let tools = dispatcher();
    let result = tools.call_tool("list_categories", None).await;

    assert!(!result.is_error);
    let text = result.text_content();
    assert!(text.starts_with("# Knowledge Base Categories\nTotal documents: 5"));
    assert!(text.contains("- **architecture**: 2 document(s)"));
}

#[tokio::test]
async fn list_categories_json_counts_sum_to_total() {
    let tools = dispatcher();
    let result = tools
        .call_tool("list_categories", Some(json!({ "format": "json" })))
        .await;

    let value: serde_json::Value = serde_json::from_str(result.text_content()).unwrap();
    let categories = value["categories"].as_array().unwrap();
    let sum: u64 = categories
        .iter()
        .map(|c| c["document_count"].as_u64().unwrap())
        .sum();
    assert_eq!(sum, value["total_documents"].as_u64().unwrap());

    let names: Vec<&str> = categories.iter().map(|c| c["name"].as_str().unwrap()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(names, sorted);
}

#[tokio::test]
async fn list_categories_rejects_unknown_fields() {
    let tools = dispatcher();
    let result = tools
        .call_tool("list_categories", Some(json!({ "category": "security" })))
        .await;
    assert!(result.is_error);
}

// ---------------------------------------------------------------------------
// Dispatcher-wide behaviour
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_tool_is_a_tool_error() {
    let tools = dispatcher();
    let result = tools.call_tool("delete_everything", Some(json!({}))).await;

    assert!(result.is_error);
    assert_eq!(result.text_content(), "Unknown tool: delete_everything");
}

#[tokio::test]
async fn small_budget_truncates_tool_output() {
    let config = ServerConfig {
        render: RenderConfig::new(200, 50).unwrap(),
        ..ServerConfig::default()
    };
    let tools = dispatcher_with(config);
    let result = tools
        .call_tool(
            "get_document",
            Some(json!({ "document_id": "doc-004" })),
        )
        .await;

    let text = result.text_content();
    assert!(text.chars().count() <= 200);
    assert!(text.ends_with(TRUNCATION_MARKER));
}

#[tokio::test]
async fn oversized_validation_error_is_truncated() {
    let tools = dispatcher();
    let result = tools
        .call_tool(
            "search_knowledge_base",
            Some(json!({ "query": "q".repeat(100_000) })),
        )
        .await;

    assert!(result.is_error);
    let text = result.text_content();
    assert!(text.starts_with("Invalid arguments for tool 'search_knowledge_base'"));
    assert!(text.chars().count() <= DEFAULT_CHARACTER_LIMIT);
    assert!(text.ends_with(TRUNCATION_MARKER));
}

#[tokio::test]
async fn oversized_unknown_tool_name_is_truncated() {
    let tools = dispatcher();
    let name = "x".repeat(100_000);
    let result = tools.call_tool(&name, None).await;

    assert!(result.is_error);
    let text = result.text_content();
    assert!(text.starts_with("Unknown tool: xxx"));
    assert!(text.chars().count() <= DEFAULT_CHARACTER_LIMIT);
    assert!(text.ends_with(TRUNCATION_MARKER));
}

#[tokio::test]
async fn panicking_handler_becomes_internal_error() {
    let tools = dispatcher();
    let outcome = tools
        .execute_guarded("search_knowledge_base", |_ctx| -> Result<ToolResult, ToolError> {
            panic!("handler blew up")
        })
        .await;

    let err = match outcome {
        Err(err) => err,
        Ok(result) => panic!("expected an internal error, got {result:?}"),
    };
    assert_eq!(
        err.message(),
        "Error executing tool 'search_knowledge_base': internal error (handler panicked)"
    );
    let result = err.into_result(&Renderer::default());
    assert!(result.is_error);
    assert!(!result.text_content().contains("handler blew up"));

    // The dispatcher keeps serving after a panic.
    let next = tools
        .call_tool("search_knowledge_base", Some(json!({ "query": "api" })))
        .await;
    assert!(!next.is_error);
}

#[tokio::test]
async fn slow_handler_times_out() {
    let config = ServerConfig {
        tool_timeout: Duration::from_millis(20),
        ..ServerConfig::default()
    };
    let tools = dispatcher_with(config);
    let outcome = tools
        .execute_guarded("get_document", |_ctx| {
            std::thread::sleep(Duration::from_millis(500));
            Ok(ToolResult::text("late"))
        })
        .await;

    let err = match outcome {
        Err(err) => err,
        Ok(result) => panic!("expected a timeout, got {result:?}"),
    };
    assert_eq!(
        err.message(),
        "Error executing tool 'get_document': internal error (timed out)"
    );
}

#[tokio::test]
async fn guarded_job_sees_shared_context() {
    let tools = dispatcher();
    let outcome = tools
        .execute_guarded("list_categories", |ctx| {
            Ok(ToolResult::text(ctx.engine.list_categories().total_documents.to_string()))
        })
        .await;

    assert_eq!(outcome.unwrap().text_content(), "5");
}

#[tokio::test]
async fn concurrent_calls_are_independent() {
    let tools = dispatcher();
    let args = json!({ "query": "event", "format": "json" });

    let (a, b, c) = tokio::join!(
        tools.call_tool("search_knowledge_base", Some(args.clone())),
        tools.call_tool("search_knowledge_base", Some(args.clone())),
        tools.call_tool("list_categories", None),
    );

    assert_eq!(a.text_content(), b.text_content());
    assert!(!c.is_error);
}

// ---------------------------------------------------------------------------
// JSON-RPC routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dispatch_tools_list_advertises_all_tools() {
    let tools = dispatcher();

    let req = JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: Some(RpcId::Number(1)),
        method: "tools/list".into(),
        params: None,
    };

    let response = handlers::dispatch(&req, &tools).await.unwrap();
    let result = response.result.unwrap();
    let listed = result["tools"].as_array().unwrap();

    let tool_names: Vec<&str> = listed
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();

    assert_eq!(
        tool_names,
        vec!["search_knowledge_base", "get_document", "list_categories"]
    );
    for tool in listed {
        assert!(tool["description"].as_str().unwrap().contains("When to use"));
        assert_eq!(tool["inputSchema"]["type"], "object");
        assert_eq!(tool["inputSchema"]["additionalProperties"], false);
    }

    let search = &listed[0]["inputSchema"]["properties"];
    assert_eq!(search["max_results"]["minimum"], 1);
    assert_eq!(search["max_results"]["maximum"], 10);
    assert_eq!(search["max_results"]["default"], 5);
    assert_eq!(search["query"]["maxLength"], 500);
}

#[tokio::test]
async fn dispatch_search_via_tools_call() {
    let tools = dispatcher();

    let req = JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: Some(RpcId::Number(2)),
        method: "tools/call".into(),
        params: Some(json!({
            "name": "search_knowledge_base",
            "arguments": { "query": "kafka", "format": "json" }
        })),
    };

    let response = handlers::dispatch(&req, &tools).await.unwrap();
    assert!(response.error.is_none());
    let result = response.result.unwrap();

    assert!(result.get("isError").is_none());
    let text = result["content"][0]["text"].as_str().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(text).unwrap();
    assert_eq!(parsed["documents"][0]["id"], "doc-002");
}

#[tokio::test]
async fn dispatch_validation_failure_stays_inside_tool_result() {
    let tools = dispatcher();

    let req = JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: Some(RpcId::Str("abc".into())),
        method: "tools/call".into(),
        params: Some(json!({
            "name": "search_knowledge_base",
            "arguments": { "query": "kafka", "max_results": 11 }
        })),
    };

    let response = handlers::dispatch(&req, &tools).await.unwrap();
    assert!(response.error.is_none());
    let result = response.result.unwrap();
    assert_eq!(result["isError"], true);
    assert_eq!(result["content"][0]["type"], "text");
}

#[tokio::test]
async fn dispatch_tools_call_without_params() {
    let tools = dispatcher();

    let req = JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: Some(RpcId::Number(3)),
        method: "tools/call".into(),
        params: None,
    };

    let response = handlers::dispatch(&req, &tools).await.unwrap();
    assert_eq!(response.error.unwrap().code, -32602);
}

#[tokio::test]
async fn dispatch_unknown_method() {
    let tools = dispatcher();

    let req = JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: Some(RpcId::Number(4)),
        method: "resources/list".into(),
        params: None,
    };

    let response = handlers::dispatch(&req, &tools).await.unwrap();
    assert_eq!(response.error.unwrap().code, -32601);
}

#[tokio::test]
async fn dispatch_initialized_notification_has_no_response() {
    let tools = dispatcher();

    let req = JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: None,
        method: "notifications/initialized".into(),
        params: None,
    };

    assert!(handlers::dispatch(&req, &tools).await.is_none());
}
