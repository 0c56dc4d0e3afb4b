//! Daemon entry point for the CDISC Library MCP server.
//!
//! Loads configuration from the environment, builds the HTTP library client,
//! and serves the MCP protocol over stdio or streamable HTTP.

mod config;

use std::sync::Arc;

use cdisc_core::{CdiscLibrary, HttpLibraryClient, LibraryConfig};
use cdisc_mcp::server::{self, McpHttpServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::CdiscConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // stdout carries the MCP protocol in stdio mode; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = CdiscConfig::from_args()?;
    let library_config = LibraryConfig::new(config.api_key.clone())
        .with_base_url(config.base_url.clone())
        .with_timeout(config.request_timeout);
    let client = HttpLibraryClient::new(library_config)?;
    let library = Arc::new(CdiscLibrary::new(client));

    if config.enable_stdio {
        info!("serving MCP over stdio");
        server::serve_stdio(library).await?;
        return Ok(());
    }

    info!(addr = %config.mcp_http_addr, "serving MCP over streamable HTTP");
    server::serve_streamable_http(library, McpHttpServerConfig::new(config.mcp_http_addr)).await?;
    Ok(())
}
