//! OpenAI MCP Server
//!
//! Entry point for the openai-mcp binary. `serve` starts the MCP server on
//! the configured transport; `install` registers the server with a supported
//! MCP host application.

use anyhow::Result;
use clap::{Parser, Subcommand};
use openai_mcp::ImageServer;
use openai_mcp_common::{Config, McpServerBuilder, TransportArgs};

/// Command-line interface for the OpenAI MCP server.
#[derive(Parser, Debug)]
#[command(name = "openai-mcp")]
#[command(version)]
#[command(about = "MCP server for OpenAI API integration")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the MCP server
    Serve {
        /// Transport configuration
        #[command(flatten)]
        transport: TransportArgs,
    },
    /// Install the MCP server configuration for Roo Code or Claude Desktop
    Install,
}

#[tokio::main]
async fn main() -> Result<()> {
    openai_mcp_common::tracing::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { transport } => {
            let config = Config::from_env()?;
            if config.api_key.is_none() {
                tracing::warn!(
                    "OPENAI_API_KEY is not set; generate_image calls will fail until it is provided"
                );
            }

            let server = ImageServer::new(config);

            let transport = transport.into_transport();
            tracing::info!(transport = %transport, "Starting MCP server");

            McpServerBuilder::new(server)
                .with_transport(transport)
                .run()
                .await?;

            tracing::info!("Server stopped");
        }
        Command::Install => {
            openai_mcp::install::install()?;
        }
    }

    Ok(())
}
