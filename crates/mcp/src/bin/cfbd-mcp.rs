// Standalone MCP server binary (stdio)

use anyhow::Result;
use cfbd_mcp::{McpServer, StdioTransport};
use cfbd_sdk::config::{API_KEY_ENV, BASE_URL_ENV, TIMEOUT_ENV};
use cfbd_sdk::{ClientConfig, HttpTransport};
use clap::Parser;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "cfbd-mcp")]
#[command(about = "College Football Data API tools, schemas and prompts over MCP stdio", long_about = None)]
#[command(version)]
struct Args {
    /// CFBD API key
    #[arg(long, env = "CFB_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Upstream base URL
    #[arg(long, env = "CFB_API_BASE_URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "CFB_API_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Must run before parsing so .env values feed the env fallbacks
    cfbd_sdk::load_dotenv();
    let args = Args::parse();

    // Stdout carries protocol traffic; logs go to stderr
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cfbd_mcp=info,cfbd_sdk=info".into());
    if args.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    tracing::info!("CFBD MCP server starting...");

    let config = ClientConfig::from_lookup(|name| match name {
        API_KEY_ENV => args.api_key.clone(),
        BASE_URL_ENV => args.base_url.clone(),
        TIMEOUT_ENV => args.timeout_secs.map(|secs| secs.to_string()),
        _ => None,
    })?;
    tracing::info!(base_url = %config.base_url, timeout = ?config.timeout, "Upstream configured");

    let upstream = HttpTransport::new(Arc::new(config))?;
    let server = Arc::new(McpServer::cfbd(Arc::new(upstream)));
    tracing::info!("Registered {} tools", server.registry().len());

    let mut transport = StdioTransport::new();
    server.run_until(&mut transport, shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
