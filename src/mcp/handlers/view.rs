//! Handlers that move between files or act on the open file.

use serde_json::{json, Value};
use tracing::info;

use crate::mcp::protocol::ToolCallResult;

use super::utils::{direction_arg, optional_usize, read_session, required_str, viewer_error, write_session};
use super::HandlerContext;

const DEFAULT_MAX_SEGMENTS: usize = 500;

pub(crate) fn handle_viewer_open(ctx: &HandlerContext, args: &Value) -> ToolCallResult {
    let index = match args.get("index") {
        Some(_) => match optional_usize(args, "index", 0) {
            Ok(i) => i,
            Err(e) => return e,
        },
        None => return ToolCallResult::error("Missing required parameter: index".to_string()),
    };
    let mut session = match write_session(ctx) {
        Ok(s) => s,
        Err(e) => return e,
    };
    match session.select(index) {
        Ok(()) => ToolCallResult::json(&session.status_json()),
        Err(e) => viewer_error(e),
    }
}

pub(crate) fn handle_viewer_step(ctx: &HandlerContext, args: &Value) -> ToolCallResult {
    let direction = match direction_arg(args) {
        Ok(d) => d,
        Err(e) => return e,
    };
    let mut session = match write_session(ctx) {
        Ok(s) => s,
        Err(e) => return e,
    };
    if session.items().is_empty() {
        return ToolCallResult::error("The result list is empty. Call viewer_list or viewer_search_files first.".to_string());
    }
    session.step(direction);
    ToolCallResult::json(&session.status_json())
}

pub(crate) fn handle_viewer_view(ctx: &HandlerContext, args: &Value) -> ToolCallResult {
    let max_segments = match optional_usize(args, "maxSegments", DEFAULT_MAX_SEGMENTS) {
        Ok(n) => n,
        Err(e) => return e,
    };
    let session = match read_session(ctx) {
        Ok(s) => s,
        Err(e) => return e,
    };
    match session.view_json(max_segments) {
        Ok(output) => ToolCallResult::json(&output),
        Err(e) => viewer_error(e),
    }
}

pub(crate) fn handle_viewer_save(ctx: &HandlerContext, args: &Value) -> ToolCallResult {
    let content = match required_str(args, "content") {
        Ok(c) => c,
        Err(e) => return e,
    };
    let mut session = match write_session(ctx) {
        Ok(s) => s,
        Err(e) => return e,
    };
    if let Err(e) = session.save(content) {
        return viewer_error(e);
    }
    info!(bytes = content.len(), "File saved");
    let mut output = session.status_json();
    output["saved"] = json!(true);
    ToolCallResult::json(&output)
}

pub(crate) fn handle_viewer_delete(ctx: &HandlerContext) -> ToolCallResult {
    let mut session = match write_session(ctx) {
        Ok(s) => s,
        Err(e) => return e,
    };
    match session.delete_current() {
        Ok(deleted) => {
            info!(path = %deleted.path, "File deleted");
            let mut output = session.status_json();
            output["deleted"] = json!(deleted.path);
            ToolCallResult::json(&output)
        }
        Err(e) => viewer_error(e),
    }
}
