//! JSON-RPC 2.0 envelope and tool-server message types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const PROTOCOL_VERSION: &str = "2025-03-26";
pub const SERVER_NAME: &str = "vfs-viewer";
pub const SERVER_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_DATETIME"));

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INTERNAL_ERROR: i64 = -32603;

// ─── JSON-RPC 2.0 base types ────────────────────────────────────────

/// Incoming request. No `id` means a notification (no response is sent).
#[derive(Deserialize, Debug)]
pub struct JsonRpcRequest {
    #[serde(default)]
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Serialize, Debug)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    pub result: Value,
}

#[derive(Serialize, Debug)]
pub struct JsonRpcErrorResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    pub error: JsonRpcError,
}

#[derive(Serialize, Debug)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn new(id: Value, result: Value) -> Self {
        Self { jsonrpc: "2.0", id, result }
    }

    /// Serialize `payload` as the result of request `id`. A payload that
    /// fails to serialize becomes an internal-error response.
    pub fn wrap<T: Serialize>(id: Value, payload: &T) -> Value {
        let response = match serde_json::to_value(payload) {
            Ok(result) => serde_json::to_value(Self::new(id, result)),
            Err(e) => serde_json::to_value(JsonRpcErrorResponse::new(
                id,
                INTERNAL_ERROR,
                format!("Failed to serialize result: {}", e),
            )),
        };
        response.unwrap_or(Value::Null)
    }
}

impl JsonRpcErrorResponse {
    pub fn new(id: Value, code: i64, message: String) -> Self {
        Self { jsonrpc: "2.0", id, error: JsonRpcError { code, message } }
    }

    pub fn into_value(self) -> Value {
        json!({
            "jsonrpc": self.jsonrpc,
            "id": self.id,
            "error": { "code": self.error.code, "message": self.error.message },
        })
    }
}

// ─── Initialize ─────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: &'static str,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
    /// Usage guidance for clients, rendered from the shared tips.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct ServerCapabilities {
    pub tools: ToolsCapability,
}

#[derive(Serialize, Debug)]
pub struct ToolsCapability {
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

#[derive(Serialize, Debug)]
pub struct ServerInfo {
    pub name: &'static str,
    pub version: &'static str,
}

impl Default for InitializeResult {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            capabilities: ServerCapabilities {
                tools: ToolsCapability { list_changed: false },
            },
            server_info: ServerInfo { name: SERVER_NAME, version: SERVER_VERSION },
            instructions: Some(crate::tips::render_instructions()),
        }
    }
}

// ─── Tools ──────────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct ToolsListResult {
    pub tools: Vec<ToolDefinition>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Tool output: one text block, flagged when the call failed.
#[derive(Serialize, Debug)]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

#[derive(Serialize, Debug)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub content_type: &'static str,
    pub text: String,
}

impl ToolCallResult {
    fn text(text: String, is_error: bool) -> Self {
        Self { content: vec![ToolContent { content_type: "text", text }], is_error }
    }

    pub fn success(text: String) -> Self {
        Self::text(text, false)
    }

    pub fn error(text: String) -> Self {
        Self::text(text, true)
    }

    /// Success carrying a JSON document as its text.
    pub fn json(value: &Value) -> Self {
        match serde_json::to_string(value) {
            Ok(text) => Self::success(text),
            Err(e) => Self::error(format!("Failed to serialize output: {}", e)),
        }
    }

    /// The first text block, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|c| c.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_with_params() {
        let line = r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"viewer_find","arguments":{"query":"needle"}}}"#;
        let req: JsonRpcRequest = serde_json::from_str(line).unwrap();
        assert_eq!(req.method, "tools/call");
        assert_eq!(req.id, Some(json!(7)));
        let params = req.params.unwrap();
        assert_eq!(params["name"], "viewer_find");
        assert_eq!(params["arguments"]["query"], "needle");
    }

    #[test]
    fn test_parse_notification_has_no_id() {
        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(req.id.is_none());
        assert!(req.params.is_none());
    }

    #[test]
    fn test_parse_tolerates_missing_jsonrpc_field() {
        let req: JsonRpcRequest = serde_json::from_str(r#"{"id":"a","method":"ping"}"#).unwrap();
        assert_eq!(req.id, Some(json!("a")));
    }

    #[test]
    fn test_initialize_result_shape() {
        let value = serde_json::to_value(InitializeResult::default()).unwrap();
        assert_eq!(value["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(value["capabilities"]["tools"]["listChanged"], false);
        assert_eq!(value["serverInfo"]["name"], "vfs-viewer");
        assert!(value["serverInfo"]["version"].as_str().unwrap().starts_with(env!("CARGO_PKG_VERSION")));
        assert!(value["instructions"].as_str().unwrap().contains("viewer_help"));
    }

    #[test]
    fn test_wrap_builds_response_envelope() {
        let value = JsonRpcResponse::wrap(json!(3), &json!({ "ok": true }));
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 3);
        assert_eq!(value["result"]["ok"], true);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_error_response_value() {
        let value = JsonRpcErrorResponse::new(json!(5), METHOD_NOT_FOUND, "Method not found: x".to_string())
            .into_value();
        assert_eq!(value["id"], 5);
        assert_eq!(value["error"]["code"], -32601);
        assert_eq!(value["error"]["message"], "Method not found: x");
    }

    #[test]
    fn test_tool_call_result_flags() {
        let ok = serde_json::to_value(ToolCallResult::success("fine".to_string())).unwrap();
        assert_eq!(ok["content"][0]["type"], "text");
        assert!(ok.get("isError").is_none());

        let err = serde_json::to_value(ToolCallResult::error("broken".to_string())).unwrap();
        assert_eq!(err["isError"], true);
        assert_eq!(err["content"][0]["text"], "broken");
    }

    #[test]
    fn test_tool_call_result_json_text() {
        let result = ToolCallResult::json(&json!({ "count": 2 }));
        assert!(!result.is_error);
        let parsed: Value = serde_json::from_str(result.first_text().unwrap()).unwrap();
        assert_eq!(parsed["count"], 2);
    }
}
