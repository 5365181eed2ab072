//! JSON-RPC request loop over stdio.

use std::io::{self, BufRead, Write};

use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::mcp::handlers::{self, HandlerContext};
use crate::mcp::protocol::*;

/// Serve requests from stdin until it closes. One JSON document per line.
pub fn run_server(ctx: HandlerContext) {
    let stdin = io::stdin();
    let stdout = io::stdout();
    serve_lines(&ctx, stdin.lock(), stdout.lock());
}

/// The loop behind [`run_server`], generic over its streams.
pub(crate) fn serve_lines<R: BufRead, W: Write>(ctx: &HandlerContext, reader: R, mut writer: W) {
    info!("Tool server ready, waiting for JSON-RPC requests on stdin");

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!(error = %e, "Error reading stdin");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!(request = %line, "Incoming JSON-RPC");

        let response = match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => match request.id {
                Some(id) => handle_request(ctx, &request.method, &request.params, id),
                None => {
                    debug!(method = %request.method, "Received notification");
                    continue;
                }
            },
            Err(e) => {
                warn!(error = %e, "Failed to parse JSON-RPC request");
                JsonRpcErrorResponse::new(Value::Null, PARSE_ERROR, format!("Parse error: {}", e)).into_value()
            }
        };

        let text = response.to_string();
        debug!(response = %text, "Outgoing JSON-RPC");
        if writeln!(writer, "{}", text).and_then(|_| writer.flush()).is_err() {
            error!("stdout closed, shutting down");
            return;
        }
    }

    info!("stdin closed, shutting down");
}

pub(crate) fn handle_request(ctx: &HandlerContext, method: &str, params: &Option<Value>, id: Value) -> Value {
    match method {
        "initialize" => JsonRpcResponse::wrap(id, &InitializeResult::default()),
        "tools/list" => JsonRpcResponse::wrap(id, &ToolsListResult { tools: handlers::tool_definitions() }),
        "tools/call" => {
            let Some(params) = params else {
                return JsonRpcResponse::wrap(id, &ToolCallResult::error("Missing params".to_string()));
            };
            let tool_name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
            let arguments = params
                .get("arguments")
                .cloned()
                .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

            let result = handlers::dispatch_tool(ctx, tool_name, &arguments);
            JsonRpcResponse::wrap(id, &result)
        }
        "ping" => JsonRpcResponse::wrap(id, &json!({})),
        _ => JsonRpcErrorResponse::new(id, METHOD_NOT_FOUND, format!("Method not found: {}", method)).into_value(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::handlers::handlers_test_utils::make_ctx;

    #[test]
    fn test_handle_initialize() {
        let (_tmp, ctx) = make_ctx();
        let result = handle_request(&ctx, "initialize", &None, json!(1));
        assert_eq!(result["jsonrpc"], "2.0");
        assert_eq!(result["id"], 1);
        assert_eq!(result["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["result"]["serverInfo"]["name"], "vfs-viewer");
    }

    #[test]
    fn test_handle_tools_list() {
        let (_tmp, ctx) = make_ctx();
        let result = handle_request(&ctx, "tools/list", &None, json!(2));
        let tools = result["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 13);
        assert!(tools.iter().all(|t| t["inputSchema"].is_object()));
    }

    #[test]
    fn test_handle_tools_call_status() {
        let (_tmp, ctx) = make_ctx();
        let params = json!({ "name": "viewer_status", "arguments": {} });
        let result = handle_request(&ctx, "tools/call", &Some(params), json!(3));
        let content = result["result"]["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["type"], "text");
        let status: Value = serde_json::from_str(content[0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(status["file"]["path"], "guide.md");
    }

    #[test]
    fn test_handle_tools_call_without_arguments() {
        let (_tmp, ctx) = make_ctx();
        let params = json!({ "name": "viewer_step" });
        let result = handle_request(&ctx, "tools/call", &Some(params), json!(4));
        assert!(result["result"].get("isError").is_none());
    }

    #[test]
    fn test_handle_tools_call_missing_params() {
        let (_tmp, ctx) = make_ctx();
        let result = handle_request(&ctx, "tools/call", &None, json!(5));
        assert_eq!(result["result"]["isError"], true);
        assert!(result["result"]["content"][0]["text"].as_str().unwrap().contains("Missing params"));
    }

    #[test]
    fn test_handle_unknown_method() {
        let (_tmp, ctx) = make_ctx();
        let result = handle_request(&ctx, "resources/list", &None, json!(99));
        assert_eq!(result["id"], 99);
        assert_eq!(result["error"]["code"], -32601);
        assert!(result["error"]["message"].as_str().unwrap().contains("Method not found"));
    }

    #[test]
    fn test_handle_ping() {
        let (_tmp, ctx) = make_ctx();
        let result = handle_request(&ctx, "ping", &None, json!(42));
        assert_eq!(result["id"], 42);
        assert!(result["result"].is_object());
    }

    #[test]
    fn test_serve_lines_session() {
        let (_tmp, ctx) = make_ctx();
        let input = [
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "",
            "this is not json",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"viewer_find","arguments":{"query":"needle"}}}"#,
        ]
        .join("\n");
        let mut out = Vec::new();
        serve_lines(&ctx, input.as_bytes(), &mut out);

        let responses: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        // Notification and blank line produce nothing.
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["error"]["code"], -32700);
        assert!(responses[1]["id"].is_null());
        let found: Value =
            serde_json::from_str(responses[2]["result"]["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(found["matches"]["count"], 3);
    }
}
