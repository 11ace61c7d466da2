use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use mcp_knowledge_server::config::ServerConfig;
use mcp_knowledge_server::handlers::ToolDispatcher;
use mcp_knowledge_server::server::McpServer;
use mcp_knowledge_server::store::DocumentStore;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let store = match &config.documents_path {
        Some(path) => DocumentStore::load(path),
        None => DocumentStore::seed(),
    };
    let store = match store {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("cannot load documents: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        documents = store.len(),
        categories = store.categories().len(),
        character_limit = config.render.character_limit(),
        default_max_results = config.default_max_results,
        "knowledge base loaded"
    );

    let tools = match ToolDispatcher::new(store, &config) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("cannot build tool contracts: {e}");
            std::process::exit(1);
        }
    };

    let mut server = McpServer::new(tools);
    if let Err(e) = server.run().await {
        tracing::error!("fatal error: {e}");
        std::process::exit(1);
    }
}
