//! viewer_list / viewer_search_files: produce a new result list.

use serde_json::Value;
use tracing::info;

use vfs_viewer::filter::FilterMode;

use crate::mcp::protocol::ToolCallResult;
use crate::session::ListSource;

use super::utils::{optional_usize, required_str, viewer_error, write_session};
use super::HandlerContext;

const DEFAULT_MAX_RESULTS: usize = 20;

pub(crate) fn handle_viewer_list(ctx: &HandlerContext, args: &Value) -> ToolCallResult {
    let filter = args
        .get("filter")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let use_regex = args.get("regex").and_then(|v| v.as_bool()).unwrap_or(false);

    let source = match filter {
        Some(pattern) => ListSource::Filter {
            pattern: pattern.to_string(),
            mode: if use_regex { FilterMode::Regex } else { FilterMode::Substring },
        },
        None => ListSource::All,
    };

    load_source(ctx, source)
}

pub(crate) fn handle_viewer_search_files(ctx: &HandlerContext, args: &Value) -> ToolCallResult {
    let query = match required_str(args, "query") {
        Ok(q) => q.trim(),
        Err(e) => return e,
    };
    if query.is_empty() {
        return ToolCallResult::error("Parameter query must not be empty".to_string());
    }
    let max_results = match optional_usize(args, "maxResults", DEFAULT_MAX_RESULTS) {
        Ok(n) => n,
        Err(e) => return e,
    };

    info!(query, max_results, "Content search requested");
    load_source(ctx, ListSource::ContentSearch { query: query.to_string(), max_results })
}

fn load_source(ctx: &HandlerContext, source: ListSource) -> ToolCallResult {
    let mut session = match write_session(ctx) {
        Ok(s) => s,
        Err(e) => return e,
    };
    if let Err(e) = session.load(source) {
        return viewer_error(e);
    }

    let mut output = session.list_json();
    output["summary"]["open"] = session
        .navigator()
        .current()
        .map(|r| Value::String(r.path.clone()))
        .unwrap_or(Value::Null);
    ToolCallResult::json(&output)
}
