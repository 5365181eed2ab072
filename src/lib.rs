//! # vfs_viewer — File-Content Viewer Core
//!
//! In-document search, highlight segmentation, and cross-result file navigation
//! for a container file system. The crate is split into three cooperating pieces:
//!
//! - [`matches`] — pure case-insensitive substring search over a loaded buffer
//!   and its highlight segmentation.
//! - [`gate`] — the loader gate that owns the open file's content, resets search
//!   state on every open, and drops late fetch responses by request token.
//! - [`navigator`] — an ordered result list with a wraparound cursor that drives
//!   the gate whenever the current file changes.
//!
//! The [`container`] and [`filter`] modules provide a local-directory result-list
//! provider and fetcher so the core can be driven end to end by the CLI and the
//! stdio tool server.

use serde::{Deserialize, Serialize};

pub mod container;
pub mod error;
pub mod filter;
pub mod gate;
pub mod matches;
pub mod navigator;

pub use error::{LoadError, LoadErrorKind, NavigationError, ViewerError};
pub use gate::{Completion, ContentFetcher, LoadTicket, LoaderGate, RequestToken};
pub use matches::{advance, compute_matches, segment_for_highlight, Direction, MatchSet, Segment};
pub use navigator::{NavigationCursor, Navigator};

// ─── File types ──────────────────────────────────────────────────────

/// Identifying metadata for one file inside a container, without its body.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    pub container_id: String,
    pub file_id: String,
    pub path: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl FileReference {
    /// Last path component, as shown in file lists.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Whether this reference can be previewed as text.
    pub fn kind(&self) -> ContentKind {
        classify_mime(&self.mime_type)
    }
}

/// The loaded text body of one file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub file_id: String,
    pub text: String,
    pub encoding: String,
    pub size_bytes: u64,
}

/// One entry of a result list. `score` and `snippet` are relevance metadata
/// from the list provider; the viewer core passes them through untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResultItem {
    pub reference: FileReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl From<FileReference> for ResultItem {
    fn from(reference: FileReference) -> Self {
        Self { reference, score: None, snippet: None }
    }
}

// ─── Mime classification ─────────────────────────────────────────────

/// Whether a file body can be shown and searched as text.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Binary,
}

/// Non-`text/*` mime types whose bodies are still plain text.
const TEXTUAL_APPLICATION_TYPES: &[&str] = &[
    "application/json",
    "application/xml",
    "application/javascript",
    "application/x-yaml",
    "application/toml",
    "application/x-sh",
];

/// Classify a mime type. This is the only place that decides whether the gate
/// fetches a text body for a reference.
#[must_use]
pub fn classify_mime(mime_type: &str) -> ContentKind {
    // Parameters such as "; charset=utf-8" don't affect the decision.
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    if essence.starts_with("text/") || TEXTUAL_APPLICATION_TYPES.contains(&essence.as_str()) {
        ContentKind::Text
    } else {
        ContentKind::Binary
    }
}

/// Syntax-highlighting language for a mime type (`"text"` when unknown).
#[must_use]
pub fn language_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "text/javascript" | "application/javascript" => "javascript",
        "application/json" => "json",
        "text/html" => "html",
        "text/css" => "css",
        "text/x-python" => "python",
        "text/x-java" => "java",
        "text/x-c++" => "cpp",
        "text/x-c" => "c",
        "text/x-ruby" => "ruby",
        "text/x-php" => "php",
        "text/x-go" => "go",
        "text/x-rust" => "rust",
        "text/x-typescript" => "typescript",
        "text/x-yaml" | "application/x-yaml" => "yaml",
        "text/x-markdown" | "text/markdown" => "markdown",
        _ => "text",
    }
}

/// Human-readable size: `0 B`, `512 B`, `1.5 KB`, `2 MB`, `1.25 GB`.
/// Two decimals at most, trailing zeros dropped.
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
