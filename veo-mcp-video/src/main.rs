//! Veo MCP Video Server
//!
//! MCP server for asynchronous video generation using the Gemini API Veo
//! models.

use anyhow::Result;
use clap::Parser;
use veo_mcp_common::{Config, McpServerBuilder, TransportArgs};
use veo_mcp_video::VideoServer;

/// Command-line arguments for the video server.
#[derive(Parser, Debug)]
#[command(name = "veo-mcp-video")]
#[command(about = "MCP server for video generation using the Gemini API Veo models")]
struct Args {
    /// Transport configuration
    #[command(flatten)]
    transport: TransportArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    veo_mcp_common::tracing::init_tracing();

    tracing::info!("veo-mcp-video server starting...");

    // Parse command-line arguments
    let args = Args::parse();

    // A missing credential is the only fatal startup condition
    let config = Config::from_env()?;
    tracing::info!(api_endpoint = %config.api_endpoint, "Configuration loaded");

    // Create the server handler
    let server = VideoServer::new(config);

    // Build and run the MCP server
    let transport = args.transport.into_transport();
    tracing::info!(transport = %transport, "Starting MCP server");

    McpServerBuilder::new(server)
        .with_transport(transport)
        .run()
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
