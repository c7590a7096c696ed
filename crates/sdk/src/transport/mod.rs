//! Transport layer for the CFBD SDK.

pub mod http;

pub use http::HttpTransport;

use crate::error::CfbdResult;
use serde_json::Value;

/// Read-only access to the upstream API.
///
/// One call is one GET; implementations must not retry or cache.
#[async_trait::async_trait]
pub trait Upstream: Send + Sync {
    async fn get(&self, path: &str, query: &[(String, String)]) -> CfbdResult<Value>;
}
