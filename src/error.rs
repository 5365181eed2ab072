//! Error types for the viewer core and its front ends.

use serde::Serialize;
use thiserror::Error;

/// Why the open file has no content. Captured by the loader gate and shown to
/// the user; never propagated past the gate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// File deleted or renamed between listing and open
    #[error("File not found: {0}")]
    NotFound(String),

    /// Mime type is not text-displayable. A policy decision, not a fetch failure.
    #[error("Cannot preview {mime_type} content, download the file instead")]
    Binary { mime_type: String },

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// Expired or invalid credential, or access denied
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Failed to load file: {0}")]
    Unknown(String),
}

/// Tag-only view of [`LoadError`] for status payloads.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    NotFound,
    Binary,
    Network,
    Unauthorized,
    Unknown,
}

impl LoadError {
    pub fn kind(&self) -> LoadErrorKind {
        match self {
            LoadError::NotFound(_) => LoadErrorKind::NotFound,
            LoadError::Binary { .. } => LoadErrorKind::Binary,
            LoadError::Network(_) => LoadErrorKind::Network,
            LoadError::Unauthorized(_) => LoadErrorKind::Unauthorized,
            LoadError::Unknown(_) => LoadErrorKind::Unknown,
        }
    }

    /// Everything except `Binary` gets a retry affordance. Nothing retries automatically.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, LoadError::Binary { .. })
    }
}

/// Caller passed an index outside the result list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Index {index} is out of range for {len} item(s)")]
    OutOfRange { index: usize, len: usize },
}

/// Errors raised by the container provider, CLI, and tool server.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// I/O error (directory walk, file write)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Container root is missing or not a directory
    #[error("Container directory does not exist: {0}")]
    ContainerNotFound(String),

    /// No file is open (or it failed to load) when an operation needs one
    #[error("No file is open")]
    NoOpenFile,

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Load(#[from] LoadError),

    /// Argument validation error
    #[error("{0}")]
    InvalidArgs(String),
}
