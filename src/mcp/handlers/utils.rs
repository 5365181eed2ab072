//! Shared utility functions for tool handlers.

use std::sync::{RwLockReadGuard, RwLockWriteGuard};

use serde_json::{json, Value};
use tracing::warn;

use vfs_viewer::{Direction, ViewerError};

use crate::mcp::protocol::ToolCallResult;
use crate::session::ViewerSession;

use super::HandlerContext;

/// Arrays that may be shortened when a response is over budget, in order of preference.
const TRUNCATABLE_ARRAYS: [&str; 2] = ["segments", "files"];

// ─── Session access ─────────────────────────────────────────────────

pub(crate) fn read_session(ctx: &HandlerContext) -> Result<RwLockReadGuard<'_, ViewerSession>, ToolCallResult> {
    ctx.session
        .read()
        .map_err(|_| ToolCallResult::error("Viewer session is unavailable (lock poisoned)".to_string()))
}

pub(crate) fn write_session(ctx: &HandlerContext) -> Result<RwLockWriteGuard<'_, ViewerSession>, ToolCallResult> {
    ctx.session
        .write()
        .map_err(|_| ToolCallResult::error("Viewer session is unavailable (lock poisoned)".to_string()))
}

pub(crate) fn viewer_error(e: ViewerError) -> ToolCallResult {
    ToolCallResult::error(e.to_string())
}

// ─── Argument parsing ───────────────────────────────────────────────

pub(crate) fn required_str<'a>(args: &'a Value, name: &str) -> Result<&'a str, ToolCallResult> {
    args.get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolCallResult::error(format!("Missing required parameter: {}", name)))
}

/// Non-negative integer argument. Absent gives `default`; negative or non-integer values are rejected.
pub(crate) fn optional_usize(args: &Value, name: &str, default: usize) -> Result<usize, ToolCallResult> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => v
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| ToolCallResult::error(format!("Parameter {} must be a non-negative integer, got {}", name, v))),
    }
}

/// `direction` argument, defaulting to next.
pub(crate) fn direction_arg(args: &Value) -> Result<Direction, ToolCallResult> {
    match args.get("direction").and_then(|v| v.as_str()) {
        None => Ok(Direction::Next),
        Some(s) => Direction::parse(s).ok_or_else(|| {
            ToolCallResult::error(format!("Invalid direction '{}': expected 'next' or 'previous'", s))
        }),
    }
}

// ─── Response size limit ────────────────────────────────────────────

/// Shrink an over-budget JSON response by cutting its largest list
/// (`segments`, then `files`) and flagging `summary.truncated`.
/// Non-JSON text and responses without such a list pass through unchanged.
pub(crate) fn truncate_response_if_needed(result: ToolCallResult, max_bytes: usize) -> ToolCallResult {
    let text = match result.first_text() {
        Some(t) if max_bytes > 0 && t.len() > max_bytes => t,
        _ => return result,
    };
    let original_bytes = text.len();

    let mut output = match serde_json::from_str::<Value>(text) {
        Ok(v) => v,
        Err(_) => return result,
    };
    let key = match TRUNCATABLE_ARRAYS
        .iter()
        .find(|k| output.get(**k).map(|v| v.is_array()).unwrap_or(false))
    {
        Some(k) => *k,
        None => {
            warn!(bytes = original_bytes, max_bytes, "Response over budget and not truncatable");
            return result;
        }
    };

    let total = output[key].as_array().map(|a| a.len()).unwrap_or(0);
    let mut keep = total;
    let mut serialized = text.to_string();
    while keep > 0 && serialized.len() > max_bytes {
        // Scale down by the overshoot ratio; always drop at least one entry.
        let ratio = max_bytes as f64 / serialized.len() as f64;
        keep = ((keep as f64 * ratio) as usize).min(keep - 1);
        if let Some(items) = output[key].as_array_mut() {
            items.truncate(keep);
        }
        mark_truncated(&mut output, key, keep, total);
        serialized = match serde_json::to_string(&output) {
            Ok(s) => s,
            Err(_) => return result,
        };
    }

    warn!(
        list = key,
        original_bytes,
        final_bytes = serialized.len(),
        kept = keep,
        total,
        "Response truncated"
    );
    ToolCallResult::success(serialized)
}

fn mark_truncated(output: &mut Value, key: &str, kept: usize, total: usize) {
    if !output.get("summary").map(|s| s.is_object()).unwrap_or(false) {
        output["summary"] = json!({});
    }
    let summary = &mut output["summary"];
    summary["truncated"] = json!(true);
    summary["truncatedList"] = json!(key);
    summary["shown"] = json!(kept);
    summary["available"] = json!(total);
    summary["hint"] = json!("Response exceeded --max-response-kb; narrow the result (filter, maxSegments) to see more");
}
