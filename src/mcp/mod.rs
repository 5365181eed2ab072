//! JSON-RPC tool server: protocol types, request loop, tool handlers, file watcher.

pub mod handlers;
pub mod protocol;
pub mod server;
pub mod watcher;
