// MCP (Model Context Protocol) front-end for the College Football Data API.
// Exposes endpoint tools, schema resources and analysis prompts to agent
// clients over newline-delimited JSON-RPC.

pub mod error;
pub mod prompts;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;
pub mod transport;

pub use error::McpError;
pub use prompts::{PromptError, PromptTemplates};
pub use resources::{ResourceError, SchemaCatalog};
pub use server::{parse_message, Incoming, McpServer};
pub use tools::{Tool, ToolError, ToolRegistry};
pub use transport::{ChannelTransport, FrameError, McpTransport, MessageCodec, StdioTransport};
