//! Container watcher: debounces filesystem events and refreshes the session's result list.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info, warn};

use vfs_viewer::ViewerError;

use crate::session::ViewerSession;

/// Start a background thread that refreshes `session` after filesystem
/// changes under its container root settle for `debounce_ms`.
pub fn start_watcher(session: Arc<RwLock<ViewerSession>>, debounce_ms: u64) -> notify::Result<()> {
    let root: PathBuf = match session.read() {
        Ok(s) => s.container().root().to_path_buf(),
        Err(_) => return Err(notify::Error::generic("viewer session lock poisoned")),
    };

    let (tx, rx) = std::sync::mpsc::channel::<notify::Result<Event>>();
    let mut watcher = RecommendedWatcher::new(tx, Config::default())?;
    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!(dir = %root.display(), debounce_ms, "File watcher started");

    std::thread::spawn(move || {
        let _watcher = watcher; // keep the OS watch alive for the thread's lifetime
        let mut changed: HashSet<String> = HashSet::new();

        loop {
            match rx.recv_timeout(Duration::from_millis(debounce_ms)) {
                Ok(Ok(event)) => {
                    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)) {
                        continue;
                    }
                    changed.extend(event.paths.iter().filter_map(|p| relative_id(&root, p)));
                }
                Ok(Err(e)) => warn!(error = %e, "File watcher error"),
                Err(RecvTimeoutError::Timeout) => {
                    if changed.is_empty() {
                        continue;
                    }
                    match session.write() {
                        Ok(mut s) => {
                            if let Err(e) = apply_changes(&mut s, &changed) {
                                warn!(error = %e, "Failed to refresh result list after file changes");
                            }
                        }
                        Err(e) => error!(error = %e, "Failed to acquire viewer session write lock"),
                    }
                    changed.clear();
                }
                Err(RecvTimeoutError::Disconnected) => {
                    info!("File watcher channel closed, stopping");
                    break;
                }
            }
        }
    });

    Ok(())
}

/// Refresh the result list after `changed` (container-relative ids). The
/// open file stays open while it is still listed, and is re-fetched when it
/// was one of the changed files. Returns whether the open file was re-fetched.
pub(crate) fn apply_changes(session: &mut ViewerSession, changed: &HashSet<String>) -> Result<bool, ViewerError> {
    let before = session.navigator().gate().current().map(|r| r.file_id.clone());
    session.refresh()?;
    let after = session.navigator().gate().current().map(|r| r.file_id.clone());

    let reload = matches!((&before, &after), (Some(b), Some(a)) if a == b && changed.contains(a));
    if reload {
        debug!(file_id = ?after, "Open file changed on disk, reloading");
        session.reload()?;
    }
    info!(changes = changed.len(), reloaded = reload, "Result list refreshed after file changes");
    Ok(reload)
}

/// `/`-joined id of `path` under `root`, or `None` outside the root.
fn relative_id(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Option<_>>()?;
    if parts.is_empty() { None } else { Some(parts.join("/")) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ListSource;
    use std::fs;
    use vfs_viewer::container::LocalContainer;

    fn session_with(files: &[(&str, &str)]) -> (tempfile::TempDir, ViewerSession) {
        let tmp = tempfile::tempdir().unwrap();
        for (path, text) in files {
            fs::write(tmp.path().join(path), text).unwrap();
        }
        let container = LocalContainer::open(tmp.path(), "w").unwrap();
        let mut session = ViewerSession::new(container);
        session.load(ListSource::All).unwrap();
        (tmp, session)
    }

    fn ids(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_relative_id() {
        let root = Path::new("/srv/docs");
        assert_eq!(relative_id(root, Path::new("/srv/docs/a/b.txt")).as_deref(), Some("a/b.txt"));
        assert_eq!(relative_id(root, Path::new("/srv/docs")), None);
        assert_eq!(relative_id(root, Path::new("/srv/other/x.txt")), None);
    }

    #[test]
    fn test_new_file_is_listed_and_open_file_kept() {
        let (tmp, mut session) = session_with(&[("b.txt", "bee")]);
        let token = session.navigator().gate().token();
        fs::write(tmp.path().join("a.txt"), "ay").unwrap();

        let reloaded = apply_changes(&mut session, &ids(&["a.txt"])).unwrap();
        assert!(!reloaded);
        assert_eq!(session.items().len(), 2);
        assert_eq!(session.navigator().current().unwrap().path, "b.txt");
        assert_eq!(session.navigator().cursor().index(), Some(1));
        assert_eq!(session.navigator().gate().token(), token);
    }

    #[test]
    fn test_modified_open_file_is_reloaded() {
        let (tmp, mut session) = session_with(&[("a.txt", "one needle")]);
        session.set_query("needle");
        fs::write(tmp.path().join("a.txt"), "needle and needle").unwrap();

        assert!(apply_changes(&mut session, &ids(&["a.txt"])).unwrap());
        let gate = session.navigator().gate();
        assert_eq!(gate.content().unwrap().text, "needle and needle");
        assert_eq!(gate.matches().unwrap().len(), 2);
    }

    #[test]
    fn test_removed_open_file_moves_to_first() {
        let (tmp, mut session) = session_with(&[("a.txt", "a"), ("b.txt", "b")]);
        session.select(1).unwrap();
        fs::remove_file(tmp.path().join("b.txt")).unwrap();

        assert!(!apply_changes(&mut session, &ids(&["b.txt"])).unwrap());
        assert_eq!(session.items().len(), 1);
        assert_eq!(session.navigator().gate().current().unwrap().path, "a.txt");
    }
}
