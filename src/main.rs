use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use toolrpc::config::{load_config, ServerConfig};
use toolrpc::git_tools::register_git_tools;
use toolrpc::logging::init_logging;
use toolrpc::mcp::McpServer;

/// JSON-RPC tool server for MCP clients.
#[derive(Parser)]
#[command(name = "toolrpc", about = "JSON-RPC tool server for MCP clients")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP requests on stdin/stdout
    Serve {
        /// Path to a JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Repository the git tools run in (overrides the config file)
        #[arg(short, long)]
        repo: Option<PathBuf>,
    },
    /// Print the registered tool definitions as JSON
    Tools {
        /// Path to a JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> toolrpc::errors::Result<()> {
    match cli.command {
        Commands::Serve { config, repo } => {
            let mut config = resolve_config(config)?;
            if repo.is_some() {
                config.repo_dir = repo;
            }
            let server = build_server(&config);
            tracing::info!(
                name = %config.server_name,
                protocol = %config.protocol_version,
                tools = server.tools().len(),
                "serving on stdio"
            );
            server.run().await?;
        }
        Commands::Tools { config } => {
            let config = resolve_config(config)?;
            let server = build_server(&config);
            println!("{}", serde_json::to_string_pretty(&server.tools().list())?);
        }
    }
    Ok(())
}

/// Builds a server from `config` with the git tools registered.
fn build_server(config: &ServerConfig) -> McpServer {
    let mut server =
        McpServer::new(config.identity()).with_request_timeout(config.request_timeout());
    register_git_tools(&mut server, config.repo_dir.clone());
    server
}

/// Loads the config file if one was given, else the defaults.
fn resolve_config(path: Option<PathBuf>) -> toolrpc::errors::Result<ServerConfig> {
    match path {
        Some(p) => load_config(&p),
        None => Ok(ServerConfig::default()),
    }
}
