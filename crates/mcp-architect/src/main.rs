//! MCP Architect Server Binary
//!
//! This binary runs the MCP server for the generate-and-review pipeline.
//! It communicates via stdio and is configured through environment variables,
//! with a `.env` file (searched from the working directory upward) supplying
//! any that are unset.
//!
//! Environment variables:
//! - GOOGLE_API_KEY: API key for Gemini (required)
//! - ANTHROPIC_API_KEY: API key for Claude (optional, reviews fall back to Gemini without it)
//! - ARCHITECT_GEMINI_MODEL: Generation model (default: gemini-2.5-flash-lite)
//! - ARCHITECT_CLAUDE_MODEL: Review model (default: claude-sonnet-4-5)
//! - ARCHITECT_CLAUDE_MAX_TOKENS: Review token limit (default: 500)
//! - ARCHITECT_MAX_RETRIES: Retries for rate-limited or 5xx provider calls (default: 3)
//! - ARCHITECT_LOG_FILE: Log file path (default: logs/server_debug.log)
//! - GEMINI_API_BASE_URL / ANTHROPIC_API_BASE_URL: Provider base URLs

use anyhow::{Context, Result};
use mcp_architect::{ArchitectService, ServiceConfig};
use rmcp::{transport::stdio, ServiceExt};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServiceConfig::from_env()?;

    // Logs go to stderr and the log file; stdout carries the protocol
    architect::logging::init_logging(&config.log_file).context("Failed to initialize logging")?;

    info!(
        gemini_model = %config.architect.gemini_model,
        claude_model = %config.architect.claude_model,
        primary_reviewer = config.architect.anthropic_api_key.is_some(),
        log_file = %config.log_file.display(),
        "Starting MCP Architect Server"
    );

    let orchestrator = config.architect.build_orchestrator()?;
    let service = ArchitectService::new(orchestrator);

    let server = service.serve(stdio()).await?;

    info!("MCP Architect Server running");

    // Wait for the server to finish (client disconnects)
    server.waiting().await?;

    info!("MCP Architect Server shutting down");

    Ok(())
}
