//! Error types for the CFBD SDK.

use cfbd_core::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result type for SDK operations.
pub type CfbdResult<T> = Result<T, CfbdError>;

/// Error types that can occur when talking to the College Football Data API.
#[derive(Debug, thiserror::Error)]
pub enum CfbdError {
    /// The API key is absent or blank.
    #[error("{0} must be set in the environment or a .env file")]
    MissingCredential(&'static str),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Query arguments failed validation; no request was sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// API returned an error response.
    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// The request never produced a response (connect failure, reset, timeout).
    #[error("Upstream unreachable: {reason}")]
    Unreachable { reason: String, timed_out: bool },

    /// A successful response whose body is not JSON.
    #[error("Invalid JSON from upstream: {0}")]
    Decode(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Coarse classification surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingCredential,
    InvalidArgument,
    UpstreamError,
    Unreachable,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingCredential => "missing_credential",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::Unreachable => "unreachable",
            ErrorKind::Internal => "internal",
        }
    }
}

impl CfbdError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential(_) => ErrorKind::MissingCredential,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Api { .. } => ErrorKind::UpstreamError,
            Self::Unreachable { .. } => ErrorKind::Unreachable,
            Self::Config(_) | Self::Decode(_) | Self::InvalidUrl(_) | Self::Http(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// HTTP status for upstream errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Create an API error from a status code and response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed_body = if body.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str::<Value>(body).unwrap_or_else(|_| Value::String(body.to_string())))
        };

        let message = match status {
            401 => "API authentication failed. Please check your API key.".to_string(),
            403 => "API access forbidden. Please check your permissions.".to_string(),
            429 => "Rate limit exceeded. Please try again later.".to_string(),
            _ => match serde_json::from_str::<ErrorResponse>(body) {
                Ok(error_response) => error_response.message,
                Err(_) if !body.trim().is_empty() => body.trim().to_string(),
                Err(_) => reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown error")
                    .to_string(),
            },
        };

        Self::Api {
            status,
            message,
            body: parsed_body,
        }
    }

    /// Classify a transport-level failure.
    pub fn unreachable(err: reqwest::Error) -> Self {
        Self::Unreachable {
            timed_out: err.is_timeout(),
            reason: err.to_string(),
        }
    }
}

/// Error body shape the upstream API uses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_message() {
        let err = CfbdError::from_response(429, "");
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.kind(), ErrorKind::UpstreamError);
        match err {
            CfbdError::Api { message, body, .. } => {
                assert!(message.contains("Rate limit"));
                assert!(body.is_none());
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_json_body_is_preserved() {
        let err = CfbdError::from_response(400, r#"{"message":"year is required"}"#);
        match err {
            CfbdError::Api { message, body, .. } => {
                assert_eq!(message, "year is required");
                assert_eq!(body, Some(serde_json::json!({"message": "year is required"})));
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_text_body() {
        let err = CfbdError::from_response(502, "Bad Gateway\n");
        match err {
            CfbdError::Api { message, body, .. } => {
                assert_eq!(message, "Bad Gateway");
                assert_eq!(body, Some(Value::String("Bad Gateway\n".to_string())));
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_body_uses_reason_phrase() {
        match CfbdError::from_response(404, "") {
            CfbdError::Api { message, .. } => assert_eq!(message, "Not Found"),
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::UpstreamError.as_str(), "upstream_error");
        assert_eq!(
            serde_json::to_value(ErrorKind::Unreachable).unwrap(),
            serde_json::json!("unreachable")
        );
        assert_eq!(
            CfbdError::MissingCredential("CFB_API_KEY").kind(),
            ErrorKind::MissingCredential
        );
    }
}
