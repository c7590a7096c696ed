use crate::oauth::AuthStore;
use anyhow::{Context, Result};
use cfbd_mcp::McpServer;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_issued_tokens_file")]
    pub issued_tokens_file: PathBuf,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_issued_tokens_file() -> PathBuf {
    PathBuf::from("./issued_tokens.json")
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            issued_tokens_file: default_issued_tokens_file(),
        }
    }
}

impl ServerConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        // Load config file if it exists, otherwise use defaults
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .context("Failed to read configuration file")?;
            toml::from_str(&content).context("Failed to parse configuration file")
        } else {
            tracing::info!("Configuration file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub mcp: Arc<McpServer>,
    pub auth: Arc<AuthStore>,
}

impl AppState {
    pub fn new(mcp: Arc<McpServer>, auth: Arc<AuthStore>) -> Self {
        Self { mcp, auth }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::load(&dir.path().join("cfbd.toml")).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(
            config.http.issued_tokens_file,
            PathBuf::from("./issued_tokens.json")
        );
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfbd.toml");
        std::fs::write(&path, "[http]\nport = 9000\n").unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.host, "127.0.0.1");
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfbd.toml");
        std::fs::write(&path, "[http\nport = ").unwrap();
        assert!(ServerConfig::load(&path).is_err());
    }
}
