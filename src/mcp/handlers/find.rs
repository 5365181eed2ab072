//! viewer_find / viewer_find_step: in-file search on the open document.

use serde_json::{json, Value};

use crate::mcp::protocol::ToolCallResult;

use super::utils::{direction_arg, required_str, write_session};
use super::HandlerContext;

pub(crate) fn handle_viewer_find(ctx: &HandlerContext, args: &Value) -> ToolCallResult {
    let query = match required_str(args, "query") {
        Ok(q) => q,
        Err(e) => return e,
    };
    let mut session = match write_session(ctx) {
        Ok(s) => s,
        Err(e) => return e,
    };

    session.set_query(query);
    let mut output = find_output(&session.status_json());
    if !session.navigator().gate().can_search() {
        // The query is kept and applies once a text file is open.
        output["hint"] = json!("No searchable file is open; the query applies to the next text file opened");
    }
    ToolCallResult::json(&output)
}

pub(crate) fn handle_viewer_find_step(ctx: &HandlerContext, args: &Value) -> ToolCallResult {
    let direction = match direction_arg(args) {
        Ok(d) => d,
        Err(e) => return e,
    };
    let mut session = match write_session(ctx) {
        Ok(s) => s,
        Err(e) => return e,
    };

    if session.navigator().gate().query().is_empty() {
        return ToolCallResult::error("No find query is active. Call viewer_find first.".to_string());
    }
    session.find_step(direction);
    ToolCallResult::json(&find_output(&session.status_json()))
}

/// The match-related slice of a status document.
fn find_output(status: &Value) -> Value {
    json!({
        "file": status["file"]["path"],
        "query": status["query"],
        "searchable": status["searchable"],
        "matches": status["matches"],
    })
}
