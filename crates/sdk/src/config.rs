//! Configuration and credential loading for the CFBD client.

use crate::error::{CfbdError, CfbdResult};
use std::time::Duration;
use url::Url;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "CFB_API_KEY";
/// Optional override of the upstream base URL.
pub const BASE_URL_ENV: &str = "CFB_API_BASE_URL";
/// Optional override of the request timeout, in seconds.
pub const TIMEOUT_ENV: &str = "CFB_API_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://apinext.collegefootballdata.com/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the CFBD client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the upstream API.
    pub base_url: Url,
    /// Bearer credential.
    pub api_key: String,
    /// Bound on each request, connect included.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration with the default timeout.
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load from the process environment.
    ///
    /// Fails with [`CfbdError::MissingCredential`] when the key is absent or blank.
    pub fn from_env() -> CfbdResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> CfbdResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(CfbdError::MissingCredential(API_KEY_ENV))?;

        let base_url = match lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            Some(url) => Url::parse(url.trim())?,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        let timeout = match lookup(TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
            Some(secs) => {
                let secs: u64 = secs.trim().parse().map_err(|_| {
                    CfbdError::Config(format!("{} must be a whole number of seconds", TIMEOUT_ENV))
                })?;
                if secs == 0 {
                    return Err(CfbdError::Config(format!("{} must be greater than zero", TIMEOUT_ENV)));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            base_url,
            api_key,
            timeout,
        })
    }
}

/// Load a `.env` file from the working directory (or a parent) if one exists.
///
/// Variables already present in the environment win.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Failed to load .env file"),
    }
}
