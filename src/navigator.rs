//! Result-set navigator: an ordered list of file references with a
//! wraparound cursor that drives the loader gate whenever the current file
//! actually changes.
//!
//! [`NavigationCursor`] is a plain value with pure transitions; [`Navigator`]
//! owns the current cursor value together with the [`LoaderGate`] and turns
//! cursor changes into `open` calls. The in-file query lives in the gate and is
//! carried across every navigation; only [`LoaderGate::close`] clears it.

use serde::Serialize;
use tracing::debug;

use crate::error::NavigationError;
use crate::gate::{Completion, ContentFetcher, LoadTicket, LoaderGate};
use crate::matches::Direction;
use crate::FileReference;

// ─── Cursor ──────────────────────────────────────────────────────────

/// Position within an ordered list of file references.
///
/// Invariant: `index` is `Some(i)` with `i < items.len()` exactly when `items`
/// is non-empty.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationCursor {
    items: Vec<FileReference>,
    index: Option<usize>,
}

impl NavigationCursor {
    /// Cursor at the first item, or empty.
    pub fn new(items: Vec<FileReference>) -> Self {
        let index = if items.is_empty() { None } else { Some(0) };
        Self { items, index }
    }

    pub fn items(&self) -> &[FileReference] {
        &self.items
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn current(&self) -> Option<&FileReference> {
        self.index.and_then(|i| self.items.get(i))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the list. The current `file_id` keeps the cursor if it is still
    /// present, otherwise the cursor goes back to the first item.
    #[must_use]
    pub fn with_items(&self, items: Vec<FileReference>) -> Self {
        let index = match self.current() {
            _ if items.is_empty() => None,
            Some(current) => Some(
                items
                    .iter()
                    .position(|item| item.file_id == current.file_id)
                    .unwrap_or(0),
            ),
            None => Some(0),
        };
        Self { items, index }
    }

    /// Move to `index`. Out of range on a non-empty list is an error; any index
    /// on an empty list leaves the cursor unchanged.
    pub fn with_index(&self, index: usize) -> Result<Self, NavigationError> {
        if self.items.is_empty() {
            return Ok(self.clone());
        }
        if index >= self.items.len() {
            return Err(NavigationError::OutOfRange { index, len: self.items.len() });
        }
        Ok(Self {
            items: self.items.clone(),
            index: Some(index),
        })
    }

    /// Index one step away from the current one, wrapping at both ends.
    /// `None` on an empty list.
    pub fn step_index(&self, direction: Direction) -> Option<usize> {
        let len = self.items.len();
        let current = self.index?;
        Some(match direction {
            Direction::Next => (current + 1) % len,
            Direction::Previous => (current + len - 1) % len,
        })
    }

    /// Cursor moved one step, wrapping at both ends. Unchanged when empty.
    #[must_use]
    pub fn stepped(&self, direction: Direction) -> Self {
        match self.step_index(direction) {
            Some(index) => Self {
                items: self.items.clone(),
                index: Some(index),
            },
            None => self.clone(),
        }
    }

    /// `"File 3 of 12"`, or `"No files"` when empty.
    pub fn position_label(&self) -> String {
        match self.index {
            Some(i) => format!("File {} of {}", i + 1, self.items.len()),
            None => "No files".to_string(),
        }
    }
}

// ─── Navigator ───────────────────────────────────────────────────────

/// A cursor over a result list plus the loader gate it drives.
#[derive(Debug, Default)]
pub struct Navigator {
    cursor: NavigationCursor,
    gate: LoaderGate,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> &NavigationCursor {
        &self.cursor
    }

    pub fn gate(&self) -> &LoaderGate {
        &self.gate
    }

    /// Mutable gate access for query edits and match stepping.
    pub fn gate_mut(&mut self) -> &mut LoaderGate {
        &mut self.gate
    }

    pub fn current(&self) -> Option<&FileReference> {
        self.cursor.current()
    }

    pub fn position_label(&self) -> String {
        self.cursor.position_label()
    }

    /// Replace the result list wholesale.
    ///
    /// Returns a ticket only when the current `file_id` changed and its body
    /// must be fetched. An empty list unloads the gate but keeps the query.
    pub fn set_items(&mut self, items: Vec<FileReference>) -> Option<LoadTicket> {
        let previous = self.cursor.current().map(|r| r.file_id.clone());
        self.cursor = self.cursor.with_items(items);

        let Some(current) = self.cursor.current().cloned() else {
            debug!("Result list is empty, unloading");
            self.gate.unload();
            return None;
        };

        if previous.as_deref() == Some(current.file_id.as_str()) {
            debug!(file_id = %current.file_id, index = ?self.cursor.index(), "Current file kept across list replacement");
            return None;
        }
        self.gate.open(current)
    }

    /// Make item `index` current. Empty list, or the same index while its file
    /// is still open in the gate: no-op. After `close` the same index reopens.
    pub fn select_index(&mut self, index: usize) -> Result<Option<LoadTicket>, NavigationError> {
        let moved = self.cursor.with_index(index)?;
        if moved.index() == self.cursor.index() && (moved.is_empty() || self.gate.current().is_some()) {
            return Ok(None);
        }
        self.cursor = moved;
        Ok(self.open_current())
    }

    pub fn next(&mut self) -> Option<LoadTicket> {
        self.step(Direction::Next)
    }

    pub fn previous(&mut self) -> Option<LoadTicket> {
        self.step(Direction::Previous)
    }

    /// Wraparound step. On a single-item list the index doesn't change and
    /// nothing is reopened.
    pub fn step(&mut self, direction: Direction) -> Option<LoadTicket> {
        let index = self.cursor.step_index(direction)?;
        // In range by construction, so this never errors.
        self.select_index(index).ok().flatten()
    }

    /// Re-open the current file, keeping the query. Used to retry a failed load.
    pub fn reload(&mut self) -> Option<LoadTicket> {
        self.open_current()
    }

    fn open_current(&mut self) -> Option<LoadTicket> {
        let reference = self.cursor.current()?.clone();
        self.gate.open(reference)
    }

    // ─── Synchronous conveniences ────────────────────────────────────

    pub fn set_items_with<F: ContentFetcher + ?Sized>(&mut self, items: Vec<FileReference>, fetcher: &F) -> Option<Completion> {
        let ticket = self.set_items(items)?;
        Some(self.gate.resolve(ticket, fetcher))
    }

    pub fn select_index_with<F: ContentFetcher + ?Sized>(
        &mut self,
        index: usize,
        fetcher: &F,
    ) -> Result<Option<Completion>, NavigationError> {
        let ticket = self.select_index(index)?;
        Ok(ticket.map(|t| self.gate.resolve(t, fetcher)))
    }

    pub fn step_with<F: ContentFetcher + ?Sized>(&mut self, direction: Direction, fetcher: &F) -> Option<Completion> {
        let ticket = self.step(direction)?;
        Some(self.gate.resolve(ticket, fetcher))
    }

    pub fn reload_with<F: ContentFetcher + ?Sized>(&mut self, fetcher: &F) -> Option<Completion> {
        let ticket = self.reload()?;
        Some(self.gate.resolve(ticket, fetcher))
    }
}

#[cfg(test)]
#[path = "navigator_tests.rs"]
mod tests;
