//! JSON-RPC 2.0 dispatch for the MCP methods this server speaks.

use ga4_mcp_tools::{ToolRegistry, ToolResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "ga4-mcp";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

/// A request without an `id` is a notification and gets no response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError { code, message }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

pub struct McpServer {
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Handles one raw message. `None` means nothing should be sent back.
    pub async fn handle_message(&self, raw: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(raw) {
            Ok(value) => self.handle_value(value).await?,
            Err(e) => JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("parse error: {}", e)),
        };

        Some(serde_json::to_string(&response).unwrap_or_else(|_| {
            r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"serialization failed"}}"#
                .to_string()
        }))
    }

    pub async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        let raw_id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    raw_id,
                    INVALID_REQUEST,
                    format!("invalid request: {}", e),
                ))
            }
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                raw_id,
                INVALID_REQUEST,
                "invalid JSON-RPC version".to_string(),
            ));
        }

        let Some(id) = request.id else {
            tracing::debug!("Notification received: {}", request.method);
            return None;
        };

        Some(self.dispatch(id, &request.method, request.params).await)
    }

    async fn dispatch(&self, id: Value, method: &str, params: Value) -> JsonRpcResponse {
        tracing::debug!("Dispatching {}", method);
        match method {
            "initialize" => JsonRpcResponse::success(id, initialize_result()),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => {
                JsonRpcResponse::success(id, json!({ "tools": self.registry.descriptors() }))
            }
            "tools/call" => self.handle_tool_call(id, params).await,
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("unknown method: {}", method),
            ),
        }
    }

    async fn handle_tool_call(&self, id: Value, params: Value) -> JsonRpcResponse {
        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("invalid params: {}", e))
            }
        };

        match self.registry.call(&params.name, params.arguments).await {
            Some(result) => JsonRpcResponse::success(id, call_tool_result(&result)),
            None => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("unknown tool: {}", params.name),
            ),
        }
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        },
        "capabilities": {
            "tools": {}
        }
    })
}

fn call_tool_result(result: &ToolResult) -> Value {
    let mut body = json!({
        "content": [{"type": "text", "text": result.text()}],
        "isError": result.is_error()
    });
    if let ToolResult::Error(payload) = result {
        body["structuredContent"] = payload.to_json();
    }
    body
}
