// MCP tool definitions and registry

use crate::protocol::ToolSchema;
use cfbd_core::{EndpointDescriptor, ParamKind, ValidationError};
use cfbd_sdk::CfbdError;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Tool executor trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool schema for MCP
    fn schema(&self) -> ToolSchema;

    /// Stable tool name, equal to `schema().name`
    fn name(&self) -> &'static str;

    /// Execute the tool with given arguments
    async fn execute(&self, arguments: Value) -> Result<Value, ToolError>;
}

/// Why a tool call did not produce upstream data.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    NotFound(String),

    #[error("Invalid arguments for {tool}: {source}")]
    InvalidArgument {
        tool: String,
        endpoint: String,
        source: ValidationError,
    },

    #[error("{tool} failed: {source}")]
    Upstream {
        tool: String,
        endpoint: String,
        source: CfbdError,
    },

    #[error("{0} was cancelled")]
    Cancelled(String),
}

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::NotFound(_) => "not_found",
            ToolError::InvalidArgument { .. } => "invalid_argument",
            ToolError::Upstream { source, .. } => source.kind().as_str(),
            ToolError::Cancelled(_) => "cancelled",
        }
    }

    /// Machine-readable detail attached to an `isError` tool result
    pub fn detail(&self) -> Value {
        let mut detail = Map::new();
        detail.insert("kind".into(), json!(self.kind()));
        match self {
            ToolError::NotFound(tool) | ToolError::Cancelled(tool) => {
                detail.insert("tool".into(), json!(tool));
            }
            ToolError::InvalidArgument {
                tool,
                endpoint,
                source,
            } => {
                detail.insert("tool".into(), json!(tool));
                detail.insert("endpoint".into(), json!(endpoint));
                detail.insert("message".into(), json!(source.to_string()));
            }
            ToolError::Upstream {
                tool,
                endpoint,
                source,
            } => {
                detail.insert("tool".into(), json!(tool));
                detail.insert("endpoint".into(), json!(endpoint));
                detail.insert("message".into(), json!(source.to_string()));
                if let Some(status) = source.status() {
                    detail.insert("status".into(), json!(status));
                }
                if let CfbdError::Api { body: Some(body), .. } = source {
                    detail.insert("body".into(), body.clone());
                }
            }
        }
        Value::Object(detail)
    }
}

/// Tool registry. Listing order is registration order.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool, replacing any earlier tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(index) => self.tools[index] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// List all tool schemas
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run a tool until it finishes or `cancel` fires, whichever is first.
    pub async fn call(
        &self,
        name: &str,
        arguments: Value,
        cancel: &CancellationToken,
    ) -> Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ToolError::Cancelled(name.to_string())),
            result = tool.execute(arguments) => result,
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: Value, required: Vec<&str>) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

pub fn json_schema_string(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description
    })
}

pub fn json_schema_integer(description: &str) -> Value {
    json!({
        "type": "integer",
        "description": description
    })
}

pub fn json_schema_enum(allowed: &[&str], description: &str) -> Value {
    json!({
        "type": "string",
        "enum": allowed,
        "description": description
    })
}

/// Input schema generated from an endpoint's parameter table
pub fn endpoint_input_schema(descriptor: &EndpointDescriptor) -> Value {
    let mut properties = Map::new();
    for param in descriptor.params {
        let schema = match param.kind {
            ParamKind::Integer => json_schema_integer(param.description),
            ParamKind::String => json_schema_string(param.description),
            ParamKind::Enum(allowed) => json_schema_enum(allowed, param.description),
        };
        properties.insert(param.name.to_string(), schema);
    }
    let required = descriptor.required_params().map(|p| p.name).collect();
    json_schema_object(Value::Object(properties), required)
}
