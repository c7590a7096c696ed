//! Main client for the CFBD SDK.

use crate::config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::error::{CfbdError, CfbdResult};
use crate::transport::HttpTransport;
use cfbd_core::Endpoint;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Client for the College Football Data API.
#[derive(Debug, Clone)]
pub struct CfbdClient {
    pub(crate) http: HttpTransport,
}

impl CfbdClient {
    /// Create a new client builder.
    pub fn builder() -> CfbdClientBuilder {
        CfbdClientBuilder::new()
    }

    /// Create a client from configuration.
    pub fn from_config(config: ClientConfig) -> CfbdResult<Self> {
        let http = HttpTransport::new(Arc::new(config))?;
        Ok(Self { http })
    }

    /// Create a client from `CFB_API_KEY` and the optional overrides.
    pub fn from_env() -> CfbdResult<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// The underlying transport, for sharing behind [`crate::Upstream`].
    pub fn transport(&self) -> &HttpTransport {
        &self.http
    }

    /// Validate a typed record, then query its endpoint.
    pub async fn fetch<E: Endpoint>(&self, query: &E) -> CfbdResult<Value> {
        query.validate()?;
        let pairs = query.query_pairs()?;
        self.http.invoke(E::DESCRIPTOR.path, &pairs).await
    }

    /// Validate loosely typed arguments for `E`, then query it.
    pub async fn fetch_with<E: Endpoint>(&self, arguments: Value) -> CfbdResult<Value> {
        let query = E::from_arguments(arguments)?;
        self.fetch(&query).await
    }
}

/// Builder for creating a CfbdClient.
pub struct CfbdClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
}

impl CfbdClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the upstream base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key for authentication.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client.
    pub fn build(self) -> CfbdResult<CfbdClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(CfbdError::MissingCredential(crate::config::API_KEY_ENV))?;

        let base_url = Url::parse(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

        let config = ClientConfig {
            base_url,
            api_key,
            timeout: self.timeout,
        };

        CfbdClient::from_config(config)
    }
}

impl Default for CfbdClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
