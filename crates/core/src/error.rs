// Validation errors raised before any upstream request is made

use thiserror::Error;

pub type ValidationResult<T> = Result<T, ValidationError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("arguments must be a JSON object")]
    NotAnObject,

    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    #[error("unexpected parameter: {0}")]
    UnknownParameter(String),

    #[error("parameter {name} must be of type {expected}")]
    WrongType { name: String, expected: &'static str },

    #[error("invalid {name} '{value}': must be one of {}", .allowed.join(", "))]
    NotAllowed {
        name: String,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("at least one of {} is required", .one_of.join(", "))]
    MissingFilter { one_of: Vec<&'static str> },

    #[error("malformed arguments: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::Malformed(err.to_string())
    }
}
