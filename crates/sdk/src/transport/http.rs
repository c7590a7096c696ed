//! HTTP transport layer for the CFBD SDK.

use crate::config::ClientConfig;
use crate::error::{CfbdError, CfbdResult};
use crate::transport::Upstream;
use reqwest::{header, Client};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// HTTP transport for making API requests.
///
/// Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> CfbdResult<Self> {
        let mut headers = header::HeaderMap::new();

        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| CfbdError::Config("Invalid API key format".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .user_agent(concat!("cfbd-mcp/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a URL for the given path, below any path prefix of the base URL.
    fn build_url(&self, path: &str) -> CfbdResult<url::Url> {
        let mut base = self.config.base_url.clone();
        if !base.path().ends_with('/') {
            let prefixed = format!("{}/", base.path());
            base.set_path(&prefixed);
        }
        Ok(base.join(path.trim_start_matches('/'))?)
    }

    /// Execute a single GET and return the JSON body verbatim.
    ///
    /// Status >= 400 becomes [`CfbdError::Api`]; connect, reset and timeout
    /// failures become [`CfbdError::Unreachable`]. Nothing is retried.
    pub async fn invoke(&self, path: &str, query: &[(String, String)]) -> CfbdResult<Value> {
        let url = self.build_url(path)?;
        debug!(url = %url, params = query.len(), "GET request");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(CfbdError::unreachable)?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), path = %path, "Upstream returned error status");
            return Err(CfbdError::from_response(status.as_u16(), &body));
        }

        let body = response.text().await.map_err(CfbdError::unreachable)?;
        serde_json::from_str(&body).map_err(|e| CfbdError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Upstream for HttpTransport {
    async fn get(&self, path: &str, query: &[(String, String)]) -> CfbdResult<Value> {
        self.invoke(path, query).await
    }
}
