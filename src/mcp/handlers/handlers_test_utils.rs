//! Shared test helpers for tool handler and server tests.

use super::*;
use crate::session::ListSource;
use std::fs;
use vfs_viewer::container::LocalContainer;

/// A temp container with three text files and one binary:
///
/// - `guide.md`: three "needle" (one upper case) over three lines
/// - `notes/todo.txt`: one "needle"
/// - `readme.txt`: no match
/// - `z.png`: NUL bytes
pub(crate) fn make_ctx() -> (tempfile::TempDir, HandlerContext) {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("notes")).unwrap();
    fs::write(root.join("guide.md"), "needle one\nsecond line needle\nNEEDLE last").unwrap();
    fs::write(root.join("notes/todo.txt"), "buy a needle").unwrap();
    fs::write(root.join("readme.txt"), "plain text").unwrap();
    fs::write(root.join("z.png"), [0x89u8, b'P', 0, 0]).unwrap();

    let container = LocalContainer::open(root, "test").unwrap();
    let mut session = ViewerSession::new(container);
    session.load(ListSource::All).unwrap();
    let ctx = HandlerContext {
        session: Arc::new(RwLock::new(session)),
        max_response_bytes: 0,
    };
    (tmp, ctx)
}

/// Call a tool and parse its JSON text. Panics on an error result.
pub(crate) fn call_ok(ctx: &HandlerContext, tool: &str, args: Value) -> Value {
    let result = dispatch_tool(ctx, tool, &args);
    let text = result.first_text().unwrap_or_default().to_string();
    assert!(!result.is_error, "{} failed: {}", tool, text);
    serde_json::from_str(&text).unwrap()
}

/// Call a tool that must fail and return its message.
pub(crate) fn call_err(ctx: &HandlerContext, tool: &str, args: Value) -> String {
    let result = dispatch_tool(ctx, tool, &args);
    assert!(result.is_error, "{} should fail", tool);
    result.first_text().unwrap_or_default().to_string()
}
