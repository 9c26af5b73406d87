//! MCP method handling shared by the stdio and HTTP transports.

use hostmon_core::{ArgumentBag, Dispatcher, Envelope, ErrorKind, Registry, SERVER_NAME, VERSION};
use serde_json::{Value, json};

use crate::jsonrpc::{
    INTERNAL_ERROR, INVALID_PARAMS, JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND,
};

/// MCP revision announced in `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Answers `initialize`, `ping`, `tools/list` and `tools/call`.
#[derive(Clone, Default)]
pub struct McpHandler {
    dispatcher: Dispatcher,
}

impl McpHandler {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Handle one message. `None` means no response is owed (notification).
    ///
    /// With `verbose` set, tool calls are logged at info level.
    pub async fn handle(&self, request: JsonRpcRequest, verbose: bool) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            log::debug!("notification: {}", request.method);
            return None;
        }
        let JsonRpcRequest {
            id, method, params, ..
        } = request;

        let response = match method.as_str() {
            "initialize" => JsonRpcResponse::success(id, initialize_result()),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": Registry::discovery() })),
            "tools/call" => self.call_tool(id, params, verbose).await,
            other => JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("unknown method: {other}")),
        };
        Some(response)
    }

    async fn call_tool(&self, id: Option<Value>, params: Option<Value>, verbose: bool) -> JsonRpcResponse {
        let Some(Value::Object(mut params)) = params else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "invalid params format");
        };
        let Some(Value::String(name)) = params.remove("name") else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "missing tool name");
        };
        let arguments: ArgumentBag = match params.remove("arguments") {
            Some(Value::Object(map)) => map,
            _ => ArgumentBag::new(),
        };
        if verbose {
            log::info!("tool call: {name} with args: {}", Value::Object(arguments.clone()));
        } else {
            log::debug!("tool call: {name}");
        }

        // Collectors sleep while sampling; keep them off the async workers.
        let dispatcher = self.dispatcher.clone();
        let envelope = match tokio::task::spawn_blocking(move || dispatcher.dispatch(&name, &arguments)).await {
            Ok(envelope) => envelope,
            Err(e) => {
                log::error!("dispatch task failed: {e}");
                return JsonRpcResponse::error(id, INTERNAL_ERROR, "internal error: dispatch task failed");
            }
        };
        envelope_response(id, envelope)
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "serverInfo": { "name": SERVER_NAME, "version": VERSION },
    })
}

/// Map a dispatch envelope onto a `tools/call` response.
pub fn envelope_response(id: Option<Value>, envelope: Envelope) -> JsonRpcResponse {
    match envelope {
        Envelope::Success { status, payload } => JsonRpcResponse::success(
            id,
            json!({
                "content": [{ "type": "text", "text": status }],
                "structuredContent": payload,
                "isError": false,
            }),
        ),
        Envelope::Failure { kind, message } => {
            let code = match kind {
                ErrorKind::UnknownOperation => METHOD_NOT_FOUND,
                _ => INTERNAL_ERROR,
            };
            JsonRpcResponse::error_with_data(id, code, message, Some(json!({ "kind": kind })))
        }
    }
}
