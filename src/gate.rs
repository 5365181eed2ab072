//! Loader gate: owns the open file's content and mediates its (re)loading.
//!
//! `open` resets all per-file state synchronously and hands back a
//! [`LoadTicket`] carrying a fresh [`RequestToken`]. The caller fetches the body
//! whenever it likes and passes the result to [`LoaderGate::complete`]; a
//! result whose token is no longer current is dropped. Two overlapping opens
//! can therefore complete in any order without a stale body ever becoming
//! visible to the search engine.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::matches::{advance, compute_matches, segment_for_highlight, Direction, MatchSet, Segment};
use crate::{ContentKind, FileContent, FileReference};

/// Fetches the text body of a file. Implemented by container providers.
pub trait ContentFetcher {
    fn fetch_content(&self, reference: &FileReference) -> Result<FileContent, LoadError>;
}

impl<F> ContentFetcher for F
where
    F: Fn(&FileReference) -> Result<FileContent, LoadError>,
{
    fn fetch_content(&self, reference: &FileReference) -> Result<FileContent, LoadError> {
        self(reference)
    }
}

/// Monotonically increasing id of one `open` call.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An outstanding fetch the caller must perform for the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "the ticket must be resolved or the gate stays in the loading state"]
pub struct LoadTicket {
    pub token: RequestToken,
    pub reference: FileReference,
}

/// What happened to a fetch result handed to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Stored as the open file's content
    Applied,
    /// Recorded as the open file's load error
    Failed,
    /// Superseded by a later open or a close; dropped
    Stale,
}

/// The open file of one viewer, its content, and the in-file search state.
#[derive(Debug, Default)]
pub struct LoaderGate {
    token: RequestToken,
    current: Option<FileReference>,
    content: Option<FileContent>,
    loading: bool,
    error: Option<LoadError>,
    query: String,
    matches: Option<MatchSet>,
}

impl LoaderGate {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Loading ─────────────────────────────────────────────────────

    /// Start showing `reference`.
    ///
    /// Content, matches, and error are cleared before this returns; the query
    /// is kept so it can be re-applied to the new content. Binary references
    /// need no fetch: the gate records [`LoadError::Binary`] and returns `None`.
    pub fn open(&mut self, reference: FileReference) -> Option<LoadTicket> {
        self.token = RequestToken(self.token.0 + 1);
        self.content = None;
        self.matches = None;
        self.error = None;

        debug!(token = %self.token, file_id = %reference.file_id, mime = %reference.mime_type, "Opening file");

        let ticket = match reference.kind() {
            ContentKind::Text => {
                self.loading = true;
                Some(LoadTicket {
                    token: self.token,
                    reference: reference.clone(),
                })
            }
            ContentKind::Binary => {
                self.loading = false;
                self.error = Some(LoadError::Binary {
                    mime_type: reference.mime_type.clone(),
                });
                None
            }
        };
        self.current = Some(reference);
        ticket
    }

    /// Apply a fetch result for `token`. Results for any token other than the
    /// latest one, or arriving after a close, are dropped.
    pub fn complete(&mut self, token: RequestToken, result: Result<FileContent, LoadError>) -> Completion {
        if token != self.token || !self.loading {
            debug!(token = %token, current = %self.token, "Dropping stale fetch result");
            return Completion::Stale;
        }

        self.loading = false;
        match result {
            Ok(content) => {
                debug!(token = %token, file_id = %content.file_id, bytes = content.text.len(), "File content loaded");
                self.content = Some(content);
                self.recompute_matches();
                Completion::Applied
            }
            Err(e) => {
                warn!(token = %token, error = %e, "Failed to load file content");
                self.error = Some(e);
                Completion::Failed
            }
        }
    }

    /// Fetch the ticket's file with `fetcher` and complete it.
    pub fn resolve<F: ContentFetcher + ?Sized>(&mut self, ticket: LoadTicket, fetcher: &F) -> Completion {
        let result = fetcher.fetch_content(&ticket.reference);
        self.complete(ticket.token, result)
    }

    /// `open` followed by `resolve`. Returns `None` when no fetch was needed.
    pub fn open_with<F: ContentFetcher + ?Sized>(&mut self, reference: FileReference, fetcher: &F) -> Option<Completion> {
        self.open(reference).map(|ticket| self.resolve(ticket, fetcher))
    }

    /// Close the viewer: discard content, matches, query, loading and error
    /// state. Outstanding tickets become stale. Idempotent.
    pub fn close(&mut self) {
        self.unload();
        self.query.clear();
    }

    /// Forget the open file but keep the query. Outstanding tickets become stale.
    pub(crate) fn unload(&mut self) {
        if self.loading {
            self.token = RequestToken(self.token.0 + 1);
        }
        self.current = None;
        self.content = None;
        self.matches = None;
        self.loading = false;
        self.error = None;
    }

    // ─── In-file search ──────────────────────────────────────────────

    /// Replace the query and recompute matches against the open content.
    /// Never triggers a fetch.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.recompute_matches();
    }

    /// Move the current match. No-op without matches.
    pub fn advance_match(&mut self, direction: Direction) {
        if let Some(set) = self.matches.take() {
            self.matches = Some(advance(set, direction));
        }
    }

    /// Highlight segmentation of the open content. Empty when nothing is loaded.
    pub fn segments(&self) -> Vec<Segment<'_>> {
        match (&self.content, &self.matches) {
            (Some(content), Some(set)) => segment_for_highlight(&content.text, set),
            (Some(content), None) => segment_for_highlight(&content.text, &MatchSet::empty(&self.query)),
            (None, _) => Vec::new(),
        }
    }

    /// Search is only possible with text content loaded.
    pub fn can_search(&self) -> bool {
        self.content.is_some()
    }

    fn recompute_matches(&mut self) {
        self.matches = match &self.content {
            Some(content) if !self.query.trim().is_empty() => Some(compute_matches(&content.text, &self.query)),
            _ => None,
        };
    }

    // ─── Accessors ───────────────────────────────────────────────────

    /// Reference of the open file, including binary files without content.
    pub fn current(&self) -> Option<&FileReference> {
        self.current.as_ref()
    }

    pub fn content(&self) -> Option<&FileContent> {
        self.content.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Active match set: present when content is loaded and the query is not blank.
    pub fn matches(&self) -> Option<&MatchSet> {
        self.matches.as_ref()
    }

    /// Token of the latest open.
    pub fn token(&self) -> RequestToken {
        self.token
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
