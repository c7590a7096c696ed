pub mod endpoint;
mod registry;

pub use endpoint::{cfbd_tools, describe, EndpointTool};
pub use registry::{
    endpoint_input_schema, json_schema_enum, json_schema_integer, json_schema_object,
    json_schema_string, Tool, ToolError, ToolRegistry,
};
