// Upstream endpoint tools

use super::registry::{endpoint_input_schema, Tool, ToolError, ToolRegistry};
use crate::protocol::ToolSchema;
use cfbd_core::queries::{
    AdvancedBoxScoreQuery, DrivesQuery, GamesQuery, GamesTeamsQuery, PlayStatsQuery, PlaysQuery,
    PregameWinProbabilityQuery, RankingsQuery, RecordsQuery,
};
use cfbd_core::{Endpoint, EndpointDescriptor, FilterRule};
use cfbd_sdk::Upstream;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

const ATTRIBUTION: &str = "Note: When using this tool, please explicitly mention that you are \
retrieving data from the College Football Data API. You must mention \"College Football Data \
API\" in every response.";

/// One upstream endpoint exposed as an MCP tool.
///
/// Arguments are validated into `E` before anything is sent; a rejected
/// call never reaches the network.
pub struct EndpointTool<E> {
    upstream: Arc<dyn Upstream>,
    _query: PhantomData<fn() -> E>,
}

impl<E: Endpoint> EndpointTool<E> {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self {
            upstream,
            _query: PhantomData,
        }
    }

    fn invalid(source: cfbd_core::ValidationError) -> ToolError {
        ToolError::InvalidArgument {
            tool: E::DESCRIPTOR.tool.to_string(),
            endpoint: E::DESCRIPTOR.path.to_string(),
            source,
        }
    }
}

#[async_trait::async_trait]
impl<E: Endpoint + 'static> Tool for EndpointTool<E> {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: E::DESCRIPTOR.tool.to_string(),
            description: describe(E::DESCRIPTOR),
            input_schema: endpoint_input_schema(E::DESCRIPTOR),
        }
    }

    fn name(&self) -> &'static str {
        E::DESCRIPTOR.tool
    }

    async fn execute(&self, arguments: Value) -> Result<Value, ToolError> {
        let descriptor = E::DESCRIPTOR;
        let query = E::from_arguments(arguments).map_err(Self::invalid)?;
        let pairs = query.query_pairs().map_err(Self::invalid)?;

        tracing::debug!(tool = descriptor.tool, endpoint = descriptor.path, "Calling upstream");

        self.upstream
            .get(descriptor.path, &pairs)
            .await
            .map_err(|source| {
                tracing::warn!(
                    tool = descriptor.tool,
                    endpoint = descriptor.path,
                    kind = source.kind().as_str(),
                    error = %source,
                    "Upstream call failed"
                );
                ToolError::Upstream {
                    tool: descriptor.tool.to_string(),
                    endpoint: descriptor.path.to_string(),
                    source,
                }
            })
    }
}

/// Tool description: attribution note, summary, parameters and examples
pub fn describe(descriptor: &EndpointDescriptor) -> String {
    let mut text = format!("{}\n\n{}", ATTRIBUTION, descriptor.summary);

    let required: Vec<&str> = descriptor.required_params().map(|p| p.name).collect();
    if !required.is_empty() {
        text.push_str(&format!("\nRequired: {}", required.join(", ")));
    }
    let optional: Vec<&str> = descriptor.optional_params().map(|p| p.name).collect();
    if !optional.is_empty() {
        text.push_str(&format!("\nOptional: {}", optional.join(", ")));
    }

    match descriptor.rule {
        FilterRule::None => {}
        FilterRule::AnyOf(names) => {
            text.push_str(&format!("\nAt least one of {} must be given.", names.join(", ")));
        }
        FilterRule::AnyParameter => text.push_str("\nAt least one parameter must be given."),
    }

    if !descriptor.examples.is_empty() {
        text.push_str("\n\nExample valid queries:");
        for example in descriptor.examples {
            text.push_str(&format!("\n- {}", example));
        }
    }
    text
}

/// Registry holding every College Football Data tool, in listing order
pub fn cfbd_tools(upstream: Arc<dyn Upstream>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(EndpointTool::<GamesQuery>::new(upstream.clone())));
    registry.register(Arc::new(EndpointTool::<RecordsQuery>::new(upstream.clone())));
    registry.register(Arc::new(EndpointTool::<GamesTeamsQuery>::new(upstream.clone())));
    registry.register(Arc::new(EndpointTool::<PlaysQuery>::new(upstream.clone())));
    registry.register(Arc::new(EndpointTool::<DrivesQuery>::new(upstream.clone())));
    registry.register(Arc::new(EndpointTool::<PlayStatsQuery>::new(upstream.clone())));
    registry.register(Arc::new(EndpointTool::<RankingsQuery>::new(upstream.clone())));
    registry.register(Arc::new(
        EndpointTool::<PregameWinProbabilityQuery>::new(upstream.clone()),
    ));
    registry.register(Arc::new(EndpointTool::<AdvancedBoxScoreQuery>::new(upstream)));
    registry
}
