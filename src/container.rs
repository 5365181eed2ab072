//! Local container provider: a directory on disk served as one container.
//!
//! Lists files as [`FileReference`]s, ranks them by keyword occurrences for
//! content search, and implements [`ContentFetcher`] over the filesystem.
//! File ids are `/`-separated paths relative to the container root.

use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, info, warn};

use crate::error::{LoadError, ViewerError};
use crate::gate::ContentFetcher;
use crate::matches::compute_matches;
use crate::{ContentKind, FileContent, FileReference, ResultItem};

/// Longest snippet returned by content search, in chars.
const SNIPPET_MAX_CHARS: usize = 160;

/// A directory exposed as a container.
#[derive(Debug, Clone)]
pub struct LocalContainer {
    root: PathBuf,
    container_id: String,
    include_hidden: bool,
}

impl LocalContainer {
    /// Open `dir` as container `container_id`. Fails when `dir` is not a directory.
    pub fn open(dir: impl AsRef<Path>, container_id: &str) -> Result<Self, ViewerError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ViewerError::ContainerNotFound(dir.display().to_string()));
        }
        let root = std::fs::canonicalize(dir)?;
        info!(root = %root.display(), container = %container_id, "Opened local container");
        Ok(Self {
            root,
            container_id: container_id.to_string(),
            include_hidden: false,
        })
    }

    /// Include dot-files and dot-directories in listings.
    #[must_use]
    pub fn with_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    pub fn id(&self) -> &str {
        &self.container_id
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ─── Listing ─────────────────────────────────────────────────────

    /// Every file under the root, sorted by path. Honors `.gitignore`.
    pub fn list_files(&self) -> Result<Vec<FileReference>, ViewerError> {
        let mut builder = WalkBuilder::new(&self.root);
        builder.hidden(!self.include_hidden);
        builder.require_git(false);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let Some(relative) = self.relative_id(entry.path()) else {
                continue;
            };
            let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
            files.push(FileReference {
                container_id: self.container_id.clone(),
                mime_type: guess_mime_type(entry.path()).to_string(),
                file_id: relative.clone(),
                path: relative,
                size_bytes,
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(count = files.len(), "Listed container files");
        Ok(files)
    }

    /// Rank text files by the number of case-insensitive occurrences of
    /// `query`. Files without a match are left out; ties go by path.
    /// `max_results == 0` keeps every hit.
    pub fn search_contents(&self, query: &str, max_results: usize) -> Result<Vec<ResultItem>, ViewerError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut results = Vec::new();
        for reference in self.list_files()? {
            if reference.kind() != ContentKind::Text {
                continue;
            }
            let content = match self.fetch_content(&reference) {
                Ok(c) => c,
                Err(e) => {
                    debug!(path = %reference.path, error = %e, "Skipping file in content search");
                    continue;
                }
            };
            let set = compute_matches(&content.text, query);
            let Some(first) = set.offsets.first() else {
                continue;
            };
            let snippet = snippet_at(&content.text, *first);
            results.push(ResultItem {
                reference,
                score: Some(set.len() as f64),
                snippet: Some(snippet),
            });
        }

        results.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .total_cmp(&a.score.unwrap_or(0.0))
                .then_with(|| a.reference.path.cmp(&b.reference.path))
        });
        if max_results > 0 {
            results.truncate(max_results);
        }
        info!(query = %query, hits = results.len(), "Content search finished");
        Ok(results)
    }

    // ─── Mutation ────────────────────────────────────────────────────

    /// Replace a file's content atomically: the new text goes to a temporary
    /// file next to the target, which is then renamed over it. The target's
    /// permissions carry over to the new file.
    pub fn replace_content(&self, file_id: &str, text: &str) -> Result<(), ViewerError> {
        let path = self.resolve(file_id)?;
        if !path.is_file() {
            return Err(LoadError::NotFound(file_id.to_string()).into());
        }
        let parent = path.parent().unwrap_or(&self.root);
        let permissions = std::fs::metadata(&path)?.permissions();

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(text.as_bytes())?;
        tmp.as_file().set_permissions(permissions)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| ViewerError::Io(e.error))?;

        info!(file_id = %file_id, bytes = text.len(), "Replaced file content");
        Ok(())
    }

    pub fn delete_file(&self, file_id: &str) -> Result<(), ViewerError> {
        let path = self.resolve(file_id)?;
        if !path.is_file() {
            return Err(LoadError::NotFound(file_id.to_string()).into());
        }
        std::fs::remove_file(&path)?;
        info!(file_id = %file_id, "Deleted file");
        Ok(())
    }

    // ─── Paths ───────────────────────────────────────────────────────

    /// Absolute path of `file_id`. Rejects absolute ids and any component that
    /// would leave the root.
    pub fn resolve(&self, file_id: &str) -> Result<PathBuf, ViewerError> {
        if file_id.is_empty() {
            return Err(ViewerError::InvalidArgs("File id must not be empty".to_string()));
        }
        let relative = Path::new(file_id);
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(ViewerError::InvalidArgs(format!(
                "File id '{}' must be a relative path inside the container",
                file_id
            )));
        }
        Ok(self.root.join(relative))
    }

    fn relative_id(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }
}

impl ContentFetcher for LocalContainer {
    fn fetch_content(&self, reference: &FileReference) -> Result<FileContent, LoadError> {
        if reference.container_id != self.container_id {
            return Err(LoadError::NotFound(format!(
                "{} is not in container {}",
                reference.path, self.container_id
            )));
        }
        let path = self
            .resolve(&reference.file_id)
            .map_err(|e| LoadError::Unknown(e.to_string()))?;
        let raw = std::fs::read(&path).map_err(|e| map_io_error(e, &reference.path))?;

        if raw.contains(&0) {
            return Err(LoadError::Binary {
                mime_type: reference.mime_type.clone(),
            });
        }

        let size_bytes = raw.len() as u64;
        let (text, encoding) = match String::from_utf8(raw) {
            Ok(s) => (s, "utf-8"),
            Err(e) => (String::from_utf8_lossy(e.as_bytes()).into_owned(), "utf-8 (lossy)"),
        };
        Ok(FileContent {
            file_id: reference.file_id.clone(),
            text,
            encoding: encoding.to_string(),
            size_bytes,
        })
    }
}

/// Map a filesystem error onto the load-error taxonomy.
fn map_io_error(err: io::Error, path: &str) -> LoadError {
    match err.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_string()),
        io::ErrorKind::PermissionDenied => LoadError::Unauthorized(format!("{}: {}", path, err)),
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::TimedOut => LoadError::Network(format!("{}: {}", path, err)),
        _ => LoadError::Unknown(format!("{}: {}", path, err)),
    }
}

/// The trimmed line containing `offset`, cut to [`SNIPPET_MAX_CHARS`].
fn snippet_at(text: &str, offset: usize) -> String {
    let start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = text[offset..].find('\n').map(|i| offset + i).unwrap_or(text.len());
    text[start..end].trim().chars().take(SNIPPET_MAX_CHARS).collect()
}

// ─── Mime types ──────────────────────────────────────────────────────

/// Mime type for a path, from its extension (or a few well-known bare names).
pub fn guess_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let Some(ext) = ext else {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        return match name {
            "Makefile" | "Dockerfile" | "LICENSE" | "README" | "CHANGELOG" => "text/plain",
            _ => "application/octet-stream",
        };
    };
    match ext.as_str() {
        "txt" | "log" | "ini" | "cfg" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" | "cjs" => "text/javascript",
        "ts" | "tsx" => "text/x-typescript",
        "rs" => "text/x-rust",
        "py" => "text/x-python",
        "java" => "text/x-java",
        "c" | "h" => "text/x-c",
        "cpp" | "cc" | "cxx" | "hpp" => "text/x-c++",
        "rb" => "text/x-ruby",
        "php" => "text/x-php",
        "go" => "text/x-go",
        "json" => "application/json",
        "xml" => "application/xml",
        "yaml" | "yml" => "application/x-yaml",
        "toml" => "application/toml",
        "sh" => "application/x-sh",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
