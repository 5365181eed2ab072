//! Tool handlers: definitions for `tools/list` and dispatch for `tools/call`.

mod find;
mod list;
pub(crate) mod utils;
mod view;

use std::sync::{Arc, RwLock};
use std::time::Instant;

use serde_json::{json, Value};
use tracing::debug;

use crate::mcp::protocol::{ToolCallResult, ToolDefinition};
use crate::session::ViewerSession;

use self::utils::{read_session, viewer_error, write_session};

/// Return all tool definitions for tools/list
pub fn tool_definitions() -> Vec<ToolDefinition> {
    let direction = json!({
        "type": "string",
        "enum": ["next", "previous"],
        "description": "Which way to move. Wraps around at both ends. (default: next)"
    });

    vec![
        ToolDefinition {
            name: "viewer_list".to_string(),
            description: "List the files of the container and make them the current result list. Optional case-insensitive filter on file name, path and mime type (substring, or regex with regex=true). The first file is opened unless the open file is still listed.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filter": {
                        "type": "string",
                        "description": "Keep only files whose name, path or mime type contains this text, e.g. 'report' or 'text/markdown'"
                    },
                    "regex": {
                        "type": "boolean",
                        "description": "Treat filter as a regular expression, e.g. '\\.(md|txt)$' (default: false)"
                    }
                },
                "required": []
            }),
        },
        ToolDefinition {
            name: "viewer_search_files".to_string(),
            description: "Rank text files by the number of case-insensitive occurrences of a term in their content and make them the current result list. Each result carries a score (occurrence count) and a snippet (first matching line). Binary files are skipped.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Term to count in file contents" },
                    "maxResults": {
                        "type": "integer",
                        "description": "Maximum number of files to return (0 = unlimited, default: 20)"
                    }
                },
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: "viewer_open".to_string(),
            description: "Open the file at a 0-based index of the current result list. The active find query is re-applied to the new file.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "index": { "type": "integer", "description": "0-based position in the result list" }
                },
                "required": ["index"]
            }),
        },
        ToolDefinition {
            name: "viewer_step".to_string(),
            description: "Open the next or previous file of the result list (wraps around). The active find query is carried over.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": { "direction": direction.clone() },
                "required": []
            }),
        },
        ToolDefinition {
            name: "viewer_reload".to_string(),
            description: "Fetch the current file again. Use after a failed load (error.retryable=true in viewer_status). Keeps the find query.".to_string(),
            input_schema: json!({ "type": "object", "properties": {}, "required": [] }),
        },
        ToolDefinition {
            name: "viewer_close".to_string(),
            description: "Close the open file and clear the find query. The result list is kept; viewer_open or viewer_step opens a file again.".to_string(),
            input_schema: json!({ "type": "object", "properties": {}, "required": [] }),
        },
        ToolDefinition {
            name: "viewer_find".to_string(),
            description: "Set the in-file find query (case-insensitive, overlapping matches). The first match becomes current. An empty query clears the highlight. The query stays active when moving to other files.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Text to find in the open file" }
                },
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: "viewer_find_step".to_string(),
            description: "Move the current match to the next or previous occurrence (wraps around). Returns the match position with line and column.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": { "direction": direction },
                "required": []
            }),
        },
        ToolDefinition {
            name: "viewer_view".to_string(),
            description: "Text of the open file as highlight segments: [{text, match, current}]. Concatenating all segment texts gives the file content. Large files are cut to maxSegments (summary.truncated=true).".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "maxSegments": {
                        "type": "integer",
                        "description": "Maximum segments to return (0 = unlimited, default: 500)"
                    }
                },
                "required": []
            }),
        },
        ToolDefinition {
            name: "viewer_status".to_string(),
            description: "Where the viewer is: result list position ('File k of n'), open file metadata, loading/error state (kind, message, retryable), content encoding and size, find query and match position ('k of n', line, column).".to_string(),
            input_schema: json!({ "type": "object", "properties": {}, "required": [] }),
        },
        ToolDefinition {
            name: "viewer_save".to_string(),
            description: "Replace the whole content of the open text file, then reload it. The write is atomic (temporary file + rename). The find query is re-applied to the new text.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "content": { "type": "string", "description": "Complete new file text" }
                },
                "required": ["content"]
            }),
        },
        ToolDefinition {
            name: "viewer_delete".to_string(),
            description: "Delete the open file from the container and refresh the result list.".to_string(),
            input_schema: json!({ "type": "object", "properties": {}, "required": [] }),
        },
        ToolDefinition {
            name: "viewer_help".to_string(),
            description: "Usage tips, recipes and tool priority as JSON.".to_string(),
            input_schema: json!({ "type": "object", "properties": {}, "required": [] }),
        },
    ]
}

/// State shared by all tool handlers.
pub struct HandlerContext {
    pub session: Arc<RwLock<ViewerSession>>,
    /// Maximum response size in bytes before truncation kicks in. 0 = no limit.
    pub max_response_bytes: usize,
}

/// Dispatch a tool call to the right handler
pub fn dispatch_tool(ctx: &HandlerContext, tool_name: &str, arguments: &Value) -> ToolCallResult {
    let start = Instant::now();

    let result = match tool_name {
        "viewer_list" => list::handle_viewer_list(ctx, arguments),
        "viewer_search_files" => list::handle_viewer_search_files(ctx, arguments),
        "viewer_open" => view::handle_viewer_open(ctx, arguments),
        "viewer_step" => view::handle_viewer_step(ctx, arguments),
        "viewer_reload" => handle_viewer_reload(ctx),
        "viewer_close" => handle_viewer_close(ctx),
        "viewer_find" => find::handle_viewer_find(ctx, arguments),
        "viewer_find_step" => find::handle_viewer_find_step(ctx, arguments),
        "viewer_view" => view::handle_viewer_view(ctx, arguments),
        "viewer_status" => handle_viewer_status(ctx),
        "viewer_save" => view::handle_viewer_save(ctx, arguments),
        "viewer_delete" => view::handle_viewer_delete(ctx),
        "viewer_help" => handle_viewer_help(),
        _ => return ToolCallResult::error(format!("Unknown tool: {}", tool_name)),
    };

    debug!(
        tool = tool_name,
        elapsed_ms = format_args!("{:.2}", start.elapsed().as_secs_f64() * 1000.0),
        is_error = result.is_error,
        "Tool call finished"
    );

    if result.is_error {
        return result;
    }
    utils::truncate_response_if_needed(result, ctx.max_response_bytes)
}

// ─── Small inline handlers ──────────────────────────────────────────

fn handle_viewer_help() -> ToolCallResult {
    ToolCallResult::json(&crate::tips::render_json())
}

fn handle_viewer_status(ctx: &HandlerContext) -> ToolCallResult {
    match read_session(ctx) {
        Ok(session) => ToolCallResult::json(&session.status_json()),
        Err(e) => e,
    }
}

fn handle_viewer_close(ctx: &HandlerContext) -> ToolCallResult {
    let mut session = match write_session(ctx) {
        Ok(s) => s,
        Err(e) => return e,
    };
    session.close();
    ToolCallResult::json(&session.status_json())
}

fn handle_viewer_reload(ctx: &HandlerContext) -> ToolCallResult {
    let mut session = match write_session(ctx) {
        Ok(s) => s,
        Err(e) => return e,
    };
    match session.reload() {
        Ok(()) => ToolCallResult::json(&session.status_json()),
        Err(e) => viewer_error(e),
    }
}

#[cfg(test)]
pub(crate) mod handlers_test_utils;

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
