use anyhow::{Context, Result};
use cfbd_mcp::McpServer;
use cfbd_sdk::config::{API_KEY_ENV, BASE_URL_ENV, TIMEOUT_ENV};
use cfbd_sdk::{ClientConfig, HttpTransport};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

mod api;
mod config;
mod middleware;
mod oauth;

use config::{AppState, ServerConfig};
use oauth::AuthStore;

#[derive(Parser, Debug)]
#[command(name = "cfbd-http")]
#[command(about = "College Football Data MCP server over streamable HTTP", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "cfbd.toml")]
    config: PathBuf,

    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// Static bearer token accepted on /mcp
    #[arg(long, env = "CFBD_HTTP_BEARER_TOKEN", hide_env_values = true)]
    bearer_token: Option<String>,

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
    cfbd_sdk::load_dotenv();
    let args = Args::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cfbd_server=info,cfbd_mcp=info,tower_http=info".into());
    if args.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    tracing::info!("Starting CFBD MCP HTTP server");

    // Load configuration
    let mut config = ServerConfig::load(&args.config)?;
    if let Some(host) = args.host.clone() {
        config.http.host = host;
    }
    if let Some(port) = args.port {
        config.http.port = port;
    }

    let bearer_token = args
        .bearer_token
        .clone()
        .filter(|t| !t.trim().is_empty())
        .context("CFBD_HTTP_BEARER_TOKEN environment variable must be set")?;

    let client_config = ClientConfig::from_lookup(|name| match name {
        API_KEY_ENV => args.api_key.clone(),
        BASE_URL_ENV => args.base_url.clone(),
        TIMEOUT_ENV => args.timeout_secs.map(|secs| secs.to_string()),
        _ => None,
    })?;
    let upstream = HttpTransport::new(Arc::new(client_config))?;
    let mcp = Arc::new(McpServer::cfbd(Arc::new(upstream)).with_name("cfbd-http"));

    let auth = Arc::new(AuthStore::load(
        bearer_token,
        config.http.issued_tokens_file.clone(),
    )?);

    // Start HTTP server
    let addr = config.bind_addr();
    tracing::info!("Starting HTTP server on {}", addr);

    api::serve(&addr, AppState::new(mcp, auth), shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
