//! Tool server startup and configuration.

use std::sync::{Arc, RwLock};
use std::time::Instant;

use tracing::{info, warn};

use vfs_viewer::container::LocalContainer;
use vfs_viewer::ViewerError;

use crate::mcp;
use crate::mcp::handlers::HandlerContext;
use crate::session::{ListSource, ViewerSession};

use super::args::ServeArgs;
use super::init_logging;

pub fn cmd_serve(args: ServeArgs) -> Result<(), ViewerError> {
    init_logging(&args.log_level, args.log_format);
    info!(dir = %args.dir, container = %args.container, watch = args.watch, "Starting tool server");

    let container = LocalContainer::open(&args.dir, &args.container)?.with_hidden(args.hidden);

    let start = Instant::now();
    let mut session = ViewerSession::new(container);
    session.load(ListSource::All)?;
    info!(
        elapsed_ms = format_args!("{:.1}", start.elapsed().as_secs_f64() * 1000.0),
        files = session.items().len(),
        "Initial result list loaded"
    );

    let session = Arc::new(RwLock::new(session));

    if args.watch {
        if let Err(e) = mcp::watcher::start_watcher(Arc::clone(&session), args.debounce_ms) {
            warn!(error = %e, "Failed to start file watcher");
        }
    }

    let max_response_bytes = args.max_response_kb.saturating_mul(1024);
    mcp::server::run_server(HandlerContext { session, max_response_bytes });
    Ok(())
}
