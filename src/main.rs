//! CLI entry point for the LangSmith MCP server.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use langsmith_mcp::client::LangSmithClient;
use langsmith_mcp::config::Config;
use langsmith_mcp::server::McpServer;
use langsmith_mcp::tools::{ToolContext, default_registry};

#[derive(Parser, Debug)]
#[command(
    name = "langsmith-mcp",
    author,
    version,
    about = "MCP server exposing read-oriented LangSmith tools",
    long_about = "MCP server for LangSmith observability data.\n\nSpeaks JSON-RPC over stdio; \
                  point an MCP client at this binary and set LANGSMITH_API_KEY."
)]
struct Cli {
    /// Subcommand to run (defaults to serving over stdio)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Config profile name
    #[arg(long)]
    profile: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve MCP over stdio (the default)
    Serve,
    /// List the registered tools and exit
    Tools,
    /// Check configuration and API connectivity, then exit
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before reading any configuration.
    let _ = dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.clone(), cli.profile.as_deref())?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config).await,
        Commands::Tools => {
            for tool in default_registry().iter() {
                println!("{:<24} {}", tool.name(), tool.description());
            }
            Ok(())
        }
        Commands::Doctor => doctor(&config).await,
    }
}

/// Logs go to stderr; stdout belongs to the protocol.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn serve(config: &Config) -> Result<()> {
    let client = LangSmithClient::new(config)?;
    let server = McpServer::new(default_registry(), ToolContext::new(client));
    server.run_stdio().await
}

async fn doctor(config: &Config) -> Result<()> {
    println!("endpoint:  {}", config.endpoint());
    match config.workspace_id() {
        Some(id) => println!("workspace: {id}"),
        None => println!("workspace: (default)"),
    }
    let client = LangSmithClient::new(config)?;
    match client.list_workspaces().await {
        Ok(workspaces) => {
            println!("api key:   ok ({} workspace(s) visible)", workspaces.len());
            Ok(())
        }
        Err(e) => {
            println!("api key:   FAILED");
            Err(e.into())
        }
    }
}
