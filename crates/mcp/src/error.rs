//! Error types for the MCP crate.

use crate::protocol::{error_codes, JsonRpcError};
use crate::transport::FrameError;

/// Errors raised by the protocol front-end itself.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Framing error: {0}")]
    Framing(#[from] FrameError),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),
}

impl McpError {
    /// Convert to a JSON-RPC error object.
    pub fn to_rpc_error(&self) -> JsonRpcError {
        let code = match self {
            McpError::JsonParse(_) | McpError::Framing(FrameError::InvalidUtf8) => {
                error_codes::PARSE_ERROR
            }
            McpError::Framing(FrameError::TooLong(_)) => error_codes::INVALID_REQUEST,
            McpError::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            McpError::Transport(_) => error_codes::INTERNAL_ERROR,
        };
        JsonRpcError::custom(code, self.to_string())
    }
}
