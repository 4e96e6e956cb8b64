//! MCP server binary for habit tracking.
//!
//! This binary runs an MCP server that exposes the habit tracker through
//! stdio transport.

use habit_tracker::config::AppConfig;
use habit_tracker::logging::{self, LogTarget};
use habit_tracker::mcp::HabitsServer;
use habit_tracker::paths;
use rmcp::ServiceExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Stdout carries the protocol, so logs only ever go to the file
    if let Some(path) = paths::default_log_path() {
        if let Err(e) = logging::init(LogTarget::File(&path)) {
            eprintln!("Warning: MCP logging init failed: {e}");
        }
    }
    logging::install_panic_hook();

    let config = AppConfig::load()?;
    let server = HabitsServer::open(config)?;
    tracing::info!("MCP server created, starting stdio transport");

    let service = server.serve(rmcp::transport::stdio()).await?;
    tracing::info!("MCP server running");
    service.waiting().await?;

    tracing::info!("MCP server shut down");
    Ok(())
}
