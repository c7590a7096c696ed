//! MCP server implementation.
//!
//! Binds the tool registry, schema catalog and prompt templates to the MCP
//! methods. `handle_request` is transport independent; `run_until` drives a
//! newline-delimited transport with one task per request.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use cfbd_sdk::Upstream;
use futures::FutureExt;
use serde_json::{json, Map, Value};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::McpError;
use crate::prompts::{PromptError, PromptTemplates};
use crate::protocol::*;
use crate::resources::{ResourceError, SchemaCatalog};
use crate::tools::{cfbd_tools, ToolError, ToolRegistry};
use crate::transport::McpTransport;

const INSTRUCTIONS: &str = "Tools query the College Football Data API. Read the schema:// \
resources for parameter and response details, and mention the College Football Data API \
when presenting results.";

/// A parsed inbound line.
#[derive(Debug)]
pub enum Incoming {
    Request(JsonRpcRequest),
    Notification(JsonRpcRequest),
    /// The line could not be understood; answer with this response
    Invalid(JsonRpcResponse),
}

/// Classify one JSON-RPC message.
pub fn parse_message(line: &str) -> Incoming {
    let raw: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse JSON");
            return Incoming::Invalid(JsonRpcResponse::error(
                Value::Null,
                McpError::JsonParse(e).to_rpc_error(),
            ));
        }
    };

    let id = raw.get("id").cloned().unwrap_or(Value::Null);
    match serde_json::from_value::<JsonRpcRequest>(raw) {
        Ok(request) if request.jsonrpc == "2.0" => {
            if request.is_notification() {
                Incoming::Notification(request)
            } else {
                Incoming::Request(request)
            }
        }
        Ok(_) | Err(_) => {
            tracing::warn!("Malformed JSON-RPC message");
            Incoming::Invalid(JsonRpcResponse::error(id, JsonRpcError::invalid_request()))
        }
    }
}

/// MCP server exposing College Football Data tools, resources and prompts.
pub struct McpServer {
    registry: ToolRegistry,
    catalog: SchemaCatalog,
    prompts: PromptTemplates,
    server_name: String,
    server_version: String,
}

impl McpServer {
    pub fn new(registry: ToolRegistry, catalog: SchemaCatalog, prompts: PromptTemplates) -> Self {
        Self {
            registry,
            catalog,
            prompts,
            server_name: "cfbd-mcp".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// The standard nine tools, nine schema resources and five prompts.
    pub fn cfbd(upstream: Arc<dyn Upstream>) -> Self {
        Self::new(
            cfbd_tools(upstream),
            SchemaCatalog::standard(),
            PromptTemplates::standard(),
        )
    }

    /// Set the server name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    pub fn prompts(&self) -> &PromptTemplates {
        &self.prompts
    }

    /// Run until the transport closes.
    pub async fn run<T: McpTransport>(self: Arc<Self>, transport: &mut T) -> Result<(), McpError> {
        self.run_until(transport, std::future::pending::<()>()).await
    }

    /// Run until the transport closes or `shutdown` resolves.
    ///
    /// Either way the loop stops reading, waits for in-flight requests and
    /// writes their responses before returning. An unusable line is answered
    /// with an error and reading continues. A failed transport also ends the
    /// loop through the drain, and its error is returned afterwards.
    pub async fn run_until<T, F>(
        self: Arc<Self>,
        transport: &mut T,
        shutdown: F,
    ) -> Result<(), McpError>
    where
        T: McpTransport,
        F: Future<Output = ()>,
    {
        tracing::info!(
            server = %self.server_name,
            tools = self.registry.len(),
            resources = self.catalog.len(),
            prompts = self.prompts.len(),
            "MCP server starting"
        );

        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(String, JsonRpcResponse)>();
        let mut in_flight: HashMap<String, CancellationToken> = HashMap::new();
        let mut tasks = JoinSet::new();
        let mut failure: Option<McpError> = None;
        let mut writable = true;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                incoming = transport.receive() => {
                    let line = match incoming {
                        Ok(Some(line)) => line,
                        Ok(None) => {
                            tracing::info!("Transport closed, shutting down");
                            break;
                        }
                        Err(e @ McpError::Framing(_)) => {
                            tracing::warn!(error = %e, "Discarding unreadable message");
                            let response = JsonRpcResponse::error(Value::Null, e.to_rpc_error());
                            if let Err(e) = send(transport, &response).await {
                                writable = false;
                                failure = Some(e);
                                break;
                            }
                            continue;
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Transport failed");
                            failure = Some(e);
                            break;
                        }
                    };
                    tracing::debug!(message = %line, "Received message");

                    let reply = match parse_message(&line) {
                        Incoming::Invalid(response) => Some(response),
                        Incoming::Notification(notification) => {
                            if let Some(cancelled) = self.handle_notification(&notification) {
                                let key = request_key(&cancelled.request_id);
                                match in_flight.get(&key) {
                                    Some(token) => {
                                        tracing::info!(request = %key, reason = ?cancelled.reason, "Cancelling request");
                                        token.cancel();
                                    }
                                    None => tracing::debug!(request = %key, "Cancel for unknown request"),
                                }
                            }
                            None
                        }
                        Incoming::Request(request) => {
                            let id = request.id.clone().unwrap_or(Value::Null);
                            let key = request_key(&id);
                            if in_flight.contains_key(&key) {
                                tracing::warn!(request = %key, "Duplicate request id in flight");
                                Some(JsonRpcResponse::error(
                                    id,
                                    JsonRpcError::custom(
                                        error_codes::INVALID_REQUEST,
                                        format!("Request id {} is already in flight", key),
                                    ),
                                ))
                            } else {
                                let token = CancellationToken::new();
                                in_flight.insert(key.clone(), token.clone());
                                let server = Arc::clone(&self);
                                let done_tx = done_tx.clone();
                                tasks.spawn(async move {
                                    let response = AssertUnwindSafe(server.handle_request(&request, &token))
                                        .catch_unwind()
                                        .await
                                        .unwrap_or_else(|_| {
                                            tracing::error!(method = %request.method, "Request handler panicked");
                                            JsonRpcResponse::error(
                                                id,
                                                JsonRpcError::internal_error("Request handler panicked"),
                                            )
                                        });
                                    let _ = done_tx.send((key, response));
                                });
                                None
                            }
                        }
                    };
                    if let Some(response) = reply {
                        if let Err(e) = send(transport, &response).await {
                            writable = false;
                            failure = Some(e);
                            break;
                        }
                    }
                }
                Some((key, response)) = done_rx.recv() => {
                    in_flight.remove(&key);
                    if let Err(e) = send(transport, &response).await {
                        writable = false;
                        failure = Some(e);
                        break;
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "Request task failed");
                    }
                }
            }
        }

        drop(done_tx);
        if !tasks.is_empty() {
            tracing::info!(pending = tasks.len(), "Draining in-flight requests");
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Request task failed");
            }
        }
        while let Some((_, response)) = done_rx.recv().await {
            if !writable {
                tracing::debug!(id = %response.id, "Transport gone, dropping response");
                continue;
            }
            if let Err(e) = send(transport, &response).await {
                writable = false;
                failure.get_or_insert(e);
            }
        }

        tracing::info!("MCP server stopped");
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Handle a single JSON-RPC request and produce a response.
    pub async fn handle_request(
        &self,
        request: &JsonRpcRequest,
        cancel: &CancellationToken,
    ) -> JsonRpcResponse {
        let id = request.id.clone().unwrap_or(Value::Null);
        let params = request.params.as_ref();

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id, params),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => {
                let result = ListToolsResult {
                    tools: self.registry.list_schemas(),
                };
                JsonRpcResponse::from_result(id, &result)
            }
            "tools/call" => self.handle_call_tool(id, params, cancel).await,
            "resources/list" => {
                let result = ListResourcesResult {
                    resources: self.catalog.list(),
                };
                JsonRpcResponse::from_result(id, &result)
            }
            "resources/templates/list" => {
                let result = ListResourceTemplatesResult {
                    resource_templates: Vec::new(),
                };
                JsonRpcResponse::from_result(id, &result)
            }
            "resources/read" => self.handle_read_resource(id, params),
            "prompts/list" => {
                let result = ListPromptsResult {
                    prompts: self.prompts.list(),
                };
                JsonRpcResponse::from_result(id, &result)
            }
            "prompts/get" => self.handle_get_prompt(id, params),
            method => {
                tracing::warn!(method = %method, "Unknown method");
                JsonRpcResponse::error(
                    id,
                    McpError::MethodNotFound(method.to_string()).to_rpc_error(),
                )
            }
        }
    }

    /// Log a notification; a cancellation is returned for the caller to act on.
    pub fn handle_notification(&self, notification: &JsonRpcRequest) -> Option<CancelledParams> {
        match notification.method.as_str() {
            "notifications/initialized" => {
                tracing::info!("Client confirmed initialization");
                None
            }
            "notifications/cancelled" => {
                let params = notification.params.clone().unwrap_or(Value::Null);
                match serde_json::from_value::<CancelledParams>(params) {
                    Ok(cancelled) => Some(cancelled),
                    Err(e) => {
                        tracing::warn!(error = %e, "Malformed cancellation");
                        None
                    }
                }
            }
            method => {
                tracing::debug!(method = %method, "Unknown notification, ignoring");
                None
            }
        }
    }

    fn handle_initialize(&self, id: Value, params: Option<&Value>) -> JsonRpcResponse {
        let requested = params
            .cloned()
            .and_then(|p| serde_json::from_value::<InitializeParams>(p).ok());

        let protocol_version = match &requested {
            Some(p) if SUPPORTED_PROTOCOL_VERSIONS.contains(&p.protocol_version.as_str()) => {
                p.protocol_version.clone()
            }
            _ => LATEST_PROTOCOL_VERSION.to_string(),
        };

        tracing::info!(
            client = requested
                .as_ref()
                .and_then(|p| p.client_info.as_ref())
                .map(|c| c.name.as_str())
                .unwrap_or("unknown"),
            protocol = %protocol_version,
            "Handling initialize"
        );

        let result = InitializeResult {
            protocol_version,
            capabilities: ServerCapabilities {
                tools: Some(ListChangedCapability {
                    list_changed: false,
                }),
                resources: Some(ResourcesCapability {
                    subscribe: false,
                    list_changed: false,
                }),
                prompts: Some(ListChangedCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: self.server_name.clone(),
                version: self.server_version.clone(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        };
        JsonRpcResponse::from_result(id, &result)
    }

    async fn handle_call_tool(
        &self,
        id: Value,
        params: Option<&Value>,
        cancel: &CancellationToken,
    ) -> JsonRpcResponse {
        let call: CallToolParams = match parse_params(params) {
            Ok(p) => p,
            Err(e) => return JsonRpcResponse::error(id, e.to_rpc_error()),
        };

        tracing::info!(tool = %call.name, "Calling tool");

        match self.registry.call(&call.name, call.arguments, cancel).await {
            Ok(payload) => JsonRpcResponse::from_result(id, &CallToolResult::success(payload)),
            Err(ToolError::NotFound(name)) => {
                JsonRpcResponse::error(id, JsonRpcError::invalid_params(format!("Unknown tool: {}", name)))
            }
            Err(ToolError::Cancelled(name)) => {
                tracing::info!(tool = %name, "Tool call cancelled");
                JsonRpcResponse::error(
                    id,
                    JsonRpcError::request_cancelled(format!("{} was cancelled", name)),
                )
            }
            Err(e) => {
                let result = CallToolResult::failure(e.to_string(), e.detail());
                JsonRpcResponse::from_result(id, &result)
            }
        }
    }

    fn handle_read_resource(&self, id: Value, params: Option<&Value>) -> JsonRpcResponse {
        let read: ReadResourceParams = match parse_params(params) {
            Ok(p) => p,
            Err(e) => return JsonRpcResponse::error(id, e.to_rpc_error()),
        };

        match self.catalog.contents(&read.uri) {
            Ok(result) => JsonRpcResponse::from_result(id, &result),
            Err(ResourceError::NotFound(uri)) => {
                JsonRpcResponse::error(id, JsonRpcError::resource_not_found(&uri))
            }
        }
    }

    fn handle_get_prompt(&self, id: Value, params: Option<&Value>) -> JsonRpcResponse {
        let get: GetPromptParams = match parse_params(params) {
            Ok(p) => p,
            Err(e) => return JsonRpcResponse::error(id, e.to_rpc_error()),
        };

        let arguments = get.arguments.unwrap_or_else(Map::new);
        match self.prompts.get_prompt(&get.name, &arguments) {
            Ok(result) => JsonRpcResponse::from_result(id, &result),
            Err(e) => {
                if let PromptError::InvalidArgument { .. } = e {
                    tracing::debug!(prompt = %get.name, error = %e, "Prompt arguments rejected");
                }
                JsonRpcResponse::error(id, JsonRpcError::invalid_params(e.to_string()))
            }
        }
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Option<&Value>) -> Result<T, McpError> {
    let params = params.ok_or_else(|| McpError::InvalidParams("missing params".to_string()))?;
    serde_json::from_value(params.clone()).map_err(|e| McpError::InvalidParams(e.to_string()))
}

/// Key for the in-flight map; ids `1` and `"1"` stay distinct.
fn request_key(id: &Value) -> String {
    id.to_string()
}

async fn send<T: McpTransport>(transport: &mut T, response: &JsonRpcResponse) -> Result<(), McpError> {
    let json = serde_json::to_string(response)?;
    tracing::debug!(response = %json, "Sending response");
    transport.send(&json).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ChannelTransport, FrameError, MAX_MESSAGE_BYTES};
    use cfbd_sdk::{CfbdError, CfbdResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Canned {
        calls: AtomicUsize,
        reply: fn() -> CfbdResult<Value>,
    }

    #[async_trait::async_trait]
    impl Upstream for Canned {
        async fn get(&self, _path: &str, _query: &[(String, String)]) -> CfbdResult<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.reply)()
        }
    }

    fn server(reply: fn() -> CfbdResult<Value>) -> (McpServer, Arc<Canned>) {
        let upstream = Arc::new(Canned {
            calls: AtomicUsize::new(0),
            reply,
        });
        (McpServer::cfbd(upstream.clone()), upstream)
    }

    fn fixture() -> CfbdResult<Value> {
        Ok(json!([{"id": 401012345, "homeTeam": "Clemson"}]))
    }

    async fn call(server: &McpServer, method: &str, params: Value) -> JsonRpcResponse {
        let request = JsonRpcRequest::new(1, method, Some(params));
        server.handle_request(&request, &CancellationToken::new()).await
    }

    #[tokio::test]
    async fn test_initialize_advertises_capabilities() {
        let (server, _) = server(fixture);
        let response = call(
            &server,
            "initialize",
            json!({"protocolVersion": "2024-11-05", "capabilities": {}, "clientInfo": {"name": "test"}}),
        )
        .await;
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "cfbd-mcp");
        assert!(result["capabilities"]["tools"].is_object());
        assert!(result["capabilities"]["resources"].is_object());
        assert!(result["capabilities"]["prompts"].is_object());
    }

    #[tokio::test]
    async fn test_initialize_unknown_version_falls_back() {
        let (server, _) = server(fixture);
        let response = call(&server, "initialize", json!({"protocolVersion": "1999-01-01"})).await;
        assert_eq!(response.result.unwrap()["protocolVersion"], LATEST_PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_surface_counts() {
        let (server, _) = server(fixture);

        let tools = call(&server, "tools/list", json!({})).await.result.unwrap();
        assert_eq!(tools["tools"].as_array().unwrap().len(), 9);

        let resources = call(&server, "resources/list", json!({})).await.result.unwrap();
        assert_eq!(resources["resources"].as_array().unwrap().len(), 9);

        let prompts = call(&server, "prompts/list", json!({})).await.result.unwrap();
        assert_eq!(prompts["prompts"].as_array().unwrap().len(), 5);

        let templates = call(&server, "resources/templates/list", json!({}))
            .await
            .result
            .unwrap();
        assert_eq!(templates["resourceTemplates"], json!([]));
    }

    #[tokio::test]
    async fn test_tool_schema_params_appear_in_resource() {
        let (server, _) = server(fixture);
        for descriptor in cfbd_core::all_endpoints() {
            let schema = server
                .registry()
                .get(descriptor.tool)
                .unwrap()
                .schema();
            let text = server.catalog().read(descriptor.resource).unwrap();
            for name in schema.input_schema["properties"].as_object().unwrap().keys() {
                assert!(text.contains(&format!("- {}: ", name)), "{} / {}", descriptor.tool, name);
            }
        }
    }

    #[tokio::test]
    async fn test_tools_call_success() {
        let (server, upstream) = server(fixture);
        let response = call(
            &server,
            "tools/call",
            json!({"name": "get-games", "arguments": {"year": 2018, "id": 401012345}}),
        )
        .await;

        let result = response.result.unwrap();
        assert!(result.get("isError").is_none());
        assert_eq!(
            result["content"][0]["text"],
            r#"[{"homeTeam":"Clemson","id":401012345}]"#
        );
        assert_eq!(result["structuredContent"]["result"][0]["id"], 401012345);
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tools_call_invalid_argument_is_tool_error() {
        let (server, upstream) = server(fixture);
        let response = call(
            &server,
            "tools/call",
            json!({"name": "get-games", "arguments": {"year": 2023, "seasonType": "spring"}}),
        )
        .await;

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["error"]["kind"], "invalid_argument");
        assert_eq!(result["structuredContent"]["error"]["endpoint"], "/games");
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_tools_call_upstream_error() {
        fn unreachable() -> CfbdResult<Value> {
            Err(CfbdError::Unreachable {
                reason: "connection refused".into(),
                timed_out: false,
            })
        }

        let (server, _) = server(unreachable);
        let response = call(
            &server,
            "tools/call",
            json!({"name": "get-rankings", "arguments": {"year": 2023}}),
        )
        .await;

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["error"]["kind"], "unreachable");
    }

    #[tokio::test]
    async fn test_unknown_tool_and_method() {
        let (server, _) = server(fixture);

        let response = call(&server, "tools/call", json!({"name": "get-weather"})).await;
        assert_eq!(response.error.unwrap().code, error_codes::INVALID_PARAMS);

        let response = call(&server, "sampling/createMessage", json!({})).await;
        assert_eq!(response.error.unwrap().code, error_codes::METHOD_NOT_FOUND);

        let response = call(&server, "ping", json!({})).await;
        assert_eq!(response.result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_pre_cancelled_call_never_reaches_upstream() {
        let (server, upstream) = server(fixture);
        let request = JsonRpcRequest::new(
            9,
            "tools/call",
            Some(json!({"name": "get-rankings", "arguments": {"year": 2023}})),
        );
        let token = CancellationToken::new();
        token.cancel();

        let response = server.handle_request(&request, &token).await;
        assert_eq!(response.error.unwrap().code, error_codes::REQUEST_CANCELLED);
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resources_read() {
        let (server, _) = server(fixture);

        let response = call(&server, "resources/read", json!({"uri": "schema://games"})).await;
        let result = response.result.unwrap();
        assert_eq!(result["contents"][0]["mimeType"], "text/plain");

        let response = call(&server, "resources/read", json!({"uri": "schema://nonexistent"})).await;
        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::RESOURCE_NOT_FOUND);
        assert_eq!(error.data, Some(json!({"uri": "schema://nonexistent"})));
    }

    #[tokio::test]
    async fn test_prompts_get() {
        let (server, _) = server(fixture);

        let response = call(
            &server,
            "prompts/get",
            json!({"name": "analyze-game", "arguments": {"gameId": "401012345"}}),
        )
        .await;
        let result = response.result.unwrap();
        assert_eq!(result["messages"][0]["role"], "user");
        assert!(result["messages"][0]["content"]["text"]
            .as_str()
            .unwrap()
            .contains("401012345"));

        let response = call(&server, "prompts/get", json!({"name": "analyze-team"})).await;
        assert_eq!(response.error.unwrap().code, error_codes::INVALID_PARAMS);

        let response = call(&server, "prompts/get", json!({"name": "nope"})).await;
        assert_eq!(response.error.unwrap().code, error_codes::INVALID_PARAMS);
    }

    #[test]
    fn test_parse_message() {
        assert!(matches!(
            parse_message(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#),
            Incoming::Request(_)
        ));
        assert!(matches!(
            parse_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#),
            Incoming::Notification(_)
        ));
        match parse_message("{not json") {
            Incoming::Invalid(r) => assert_eq!(r.error.unwrap().code, error_codes::PARSE_ERROR),
            other => panic!("unexpected {other:?}"),
        }
        match parse_message(r#"{"jsonrpc":"1.0","id":7,"method":"ping"}"#) {
            Incoming::Invalid(r) => {
                assert_eq!(r.id, json!(7));
                assert_eq!(r.error.unwrap().code, error_codes::INVALID_REQUEST);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_request_key_distinguishes_types() {
        assert_ne!(request_key(&json!(1)), request_key(&json!("1")));
    }

    /// Replays a fixed sequence of receive results, then reports EOF.
    struct Scripted {
        incoming: std::collections::VecDeque<Result<Option<String>, McpError>>,
        sent: Vec<Value>,
    }

    impl Scripted {
        fn new(incoming: Vec<Result<Option<String>, McpError>>) -> Self {
            Self {
                incoming: incoming.into(),
                sent: Vec::new(),
            }
        }

        fn response(&self, id: Value) -> &Value {
            self.sent
                .iter()
                .find(|r| r["id"] == id)
                .unwrap_or_else(|| panic!("no response for {id}: {:?}", self.sent))
        }
    }

    #[async_trait::async_trait]
    impl McpTransport for Scripted {
        async fn receive(&mut self) -> Result<Option<String>, McpError> {
            self.incoming.pop_front().unwrap_or(Ok(None))
        }

        async fn send(&mut self, message: &str) -> Result<(), McpError> {
            self.sent.push(serde_json::from_str(message)?);
            Ok(())
        }
    }

    fn line(message: Value) -> Result<Option<String>, McpError> {
        Ok(Some(message.to_string()))
    }

    struct Stalled;

    #[async_trait::async_trait]
    impl Upstream for Stalled {
        async fn get(&self, _path: &str, _query: &[(String, String)]) -> CfbdResult<Value> {
            std::future::pending().await
        }
    }

    struct Exploding;

    #[async_trait::async_trait]
    impl Upstream for Exploding {
        async fn get(&self, _path: &str, _query: &[(String, String)]) -> CfbdResult<Value> {
            panic!("upstream exploded")
        }
    }

    fn games_call(id: i64) -> Value {
        json!({"jsonrpc": "2.0", "id": id, "method": "tools/call",
               "params": {"name": "get-games", "arguments": {"year": 2014}}})
    }

    #[tokio::test]
    async fn test_unreadable_lines_are_answered_and_reading_continues() {
        let (server, _) = server(fixture);
        let mut transport = Scripted::new(vec![
            Err(McpError::Framing(FrameError::TooLong(MAX_MESSAGE_BYTES))),
            Err(McpError::Framing(FrameError::InvalidUtf8)),
            line(json!({"jsonrpc": "2.0", "id": 1, "method": "ping"})),
        ]);

        Arc::new(server)
            .run_until(&mut transport, std::future::pending())
            .await
            .unwrap();

        assert_eq!(transport.sent.len(), 3);
        assert_eq!(transport.sent[0]["id"], Value::Null);
        assert_eq!(transport.sent[0]["error"]["code"], error_codes::INVALID_REQUEST);
        assert_eq!(transport.sent[1]["id"], Value::Null);
        assert_eq!(transport.sent[1]["error"]["code"], error_codes::PARSE_ERROR);
        assert_eq!(transport.response(json!(1))["result"], json!({}));
    }

    #[tokio::test]
    async fn test_transport_failure_still_drains() {
        let (server, upstream) = server(fixture);
        let mut transport = Scripted::new(vec![
            line(games_call(1)),
            Err(McpError::Transport(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "stdin reset",
            ))),
        ]);

        let result = Arc::new(server)
            .run_until(&mut transport, std::future::pending())
            .await;

        assert!(matches!(result, Err(McpError::Transport(_))));
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);
        let response = transport.response(json!(1));
        assert!(response["result"]["isError"].is_null());
        assert_eq!(response["result"]["structuredContent"]["result"][0]["id"], 401012345);
    }

    #[tokio::test]
    async fn test_duplicate_in_flight_id_is_rejected() {
        let server = McpServer::cfbd(Arc::new(Stalled));
        let mut transport = Scripted::new(vec![
            line(games_call(7)),
            line(games_call(7)),
            line(json!({"jsonrpc": "2.0", "method": "notifications/cancelled",
                        "params": {"requestId": 7}})),
        ]);

        Arc::new(server)
            .run_until(&mut transport, std::future::pending())
            .await
            .unwrap();

        let codes: Vec<&Value> = transport.sent.iter().map(|r| &r["error"]["code"]).collect();
        assert_eq!(transport.sent.len(), 2, "{:?}", transport.sent);
        assert!(codes.contains(&&json!(error_codes::INVALID_REQUEST)));
        assert!(codes.contains(&&json!(error_codes::REQUEST_CANCELLED)));
        assert!(transport.sent.iter().all(|r| r["id"] == json!(7)));
    }

    #[tokio::test]
    async fn test_panicking_handler_answers_and_frees_its_id() {
        let server = Arc::new(McpServer::cfbd(Arc::new(Exploding)));
        let (mut client, mut server_side) = ChannelTransport::pair();
        let handle = tokio::spawn(async move {
            server.run(&mut server_side).await.unwrap();
        });

        client.send(&games_call(3).to_string()).await.unwrap();
        let first: Value = serde_json::from_str(&client.receive().await.unwrap().unwrap()).unwrap();
        assert_eq!(first["id"], 3);
        assert_eq!(first["error"]["code"], error_codes::INTERNAL_ERROR);

        // The id is free again once the panicked call has been answered
        client
            .send(&json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}).to_string())
            .await
            .unwrap();
        let second: Value = serde_json::from_str(&client.receive().await.unwrap().unwrap()).unwrap();
        assert_eq!(second["id"], 3);
        assert_eq!(second["result"], json!({}));

        drop(client);
        handle.await.unwrap();
    }
}
