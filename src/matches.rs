//! Content search engine: case-insensitive substring matches over a loaded
//! buffer, current-match navigation, and highlight segmentation.
//!
//! Everything here is pure. Offsets are byte offsets into the original text and
//! always land on char boundaries. Case folding is done one char at a time, so a
//! match always spans exactly `query.chars().count()` chars of the original
//! text and the original casing can be sliced back out for display.

use std::ops::Range;

use serde::Serialize;

/// Which way to move a cursor.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    /// Parse `"next"` / `"previous"` (also `"prev"`), case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "next" | "forward" => Some(Direction::Next),
            "previous" | "prev" | "backward" => Some(Direction::Previous),
            _ => None,
        }
    }
}

/// Matches of one query against one text.
///
/// Invariants: `offsets` is strictly increasing; `current` is `None` exactly
/// when `offsets` is empty, otherwise `Some(i)` with `i < offsets.len()`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchSet {
    pub query: String,
    pub offsets: Vec<usize>,
    pub current: Option<usize>,
}

impl MatchSet {
    /// A match set with no offsets for `query`.
    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            offsets: Vec::new(),
            current: None,
        }
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Byte offset of the current match.
    pub fn current_offset(&self) -> Option<usize> {
        self.current.and_then(|i| self.offsets.get(i).copied())
    }

    /// Byte range of match `index` within `text`. `None` if `index` is out of
    /// range or the offset doesn't fit `text`.
    pub fn match_range(&self, text: &str, index: usize) -> Option<Range<usize>> {
        let start = *self.offsets.get(index)?;
        if start > text.len() || !text.is_char_boundary(start) {
            return None;
        }
        let span = self.query.chars().count();
        let end = char_end(text, start, span)?;
        Some(start..end)
    }

    /// `"2 of 5"` for the current match, `"No matches"` when empty.
    pub fn position_label(&self) -> String {
        match self.current {
            Some(i) => format!("{} of {}", i + 1, self.offsets.len()),
            None => "No matches".to_string(),
        }
    }
}

/// Byte offset reached by walking `chars` chars forward from `start`.
/// `None` if the text ends first.
fn char_end(text: &str, start: usize, chars: usize) -> Option<usize> {
    if chars == 0 {
        return Some(start);
    }
    let mut walked = 0;
    for (i, c) in text[start..].char_indices() {
        walked += 1;
        if walked == chars {
            return Some(start + i + c.len_utf8());
        }
    }
    None
}

/// Lowercase a single char, keeping the char itself when its lowercase form is
/// more than one char (e.g. 'İ'), so folding never changes the char count.
fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Find every case-insensitive occurrence of `query` in `text`.
///
/// A blank query (whitespace only) or empty text yields no matches. The query
/// itself is not trimmed for the search. Overlapping occurrences are all
/// reported: each search restarts one char after the previous match start,
/// so `"aa"` in `"aaa"` gives `[0, 1]`.
#[must_use]
pub fn compute_matches(text: &str, query: &str) -> MatchSet {
    if query.trim().is_empty() || text.is_empty() {
        return MatchSet::empty(query);
    }

    let offsets = if text.is_ascii() && query.is_ascii() {
        ascii_offsets(text, query)
    } else {
        folded_offsets(text, query)
    };

    let current = if offsets.is_empty() { None } else { Some(0) };
    MatchSet {
        query: query.to_string(),
        offsets,
        current,
    }
}

/// Byte search over ASCII-lowercased copies. Byte offsets are char offsets here.
fn ascii_offsets(text: &str, query: &str) -> Vec<usize> {
    let haystack = text.to_ascii_lowercase();
    let needle = query.to_ascii_lowercase();
    let mut offsets = Vec::new();
    let mut from = 0;
    while from <= haystack.len() {
        match haystack[from..].find(&needle) {
            Some(pos) => {
                let start = from + pos;
                offsets.push(start);
                from = start + 1;
            }
            None => break,
        }
    }
    offsets
}

/// Char-by-char comparison of folded text against the folded query.
fn folded_offsets(text: &str, query: &str) -> Vec<usize> {
    let needle: Vec<char> = query.chars().map(fold_char).collect();
    let hay: Vec<(usize, char)> = text.char_indices().map(|(i, c)| (i, fold_char(c))).collect();
    if needle.len() > hay.len() {
        return Vec::new();
    }

    let mut offsets = Vec::new();
    for start in 0..=hay.len() - needle.len() {
        let window = &hay[start..start + needle.len()];
        if window.iter().zip(&needle).all(|((_, h), n)| h == n) {
            offsets.push(hay[start].0);
        }
    }
    offsets
}

/// Move the current match one step, wrapping at both ends. No-op when empty.
#[must_use]
pub fn advance(mut set: MatchSet, direction: Direction) -> MatchSet {
    let len = set.offsets.len();
    if len == 0 {
        return set;
    }
    let current = set.current.unwrap_or(0);
    set.current = Some(match direction {
        Direction::Next => (current + 1) % len,
        Direction::Previous => (current + len - 1) % len,
    });
    set
}

/// One piece of highlighted output, borrowed from the original text.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub is_match: bool,
    pub is_current: bool,
}

impl<'a> Segment<'a> {
    fn plain(text: &'a str) -> Self {
        Self { text, is_match: false, is_current: false }
    }
}

/// Split `text` into alternating plain and matched segments.
///
/// Matched segments keep the original casing. The segment of match number
/// `set.current` is flagged `is_current`. A match that overlaps the previous
/// one starts where the previous one ended, so the segments always
/// concatenate back to `text`. Offsets that don't fit `text` are skipped.
#[must_use]
pub fn segment_for_highlight<'a>(text: &'a str, set: &MatchSet) -> Vec<Segment<'a>> {
    if text.is_empty() {
        return Vec::new();
    }
    if set.offsets.is_empty() {
        return vec![Segment::plain(text)];
    }

    let mut segments = Vec::with_capacity(set.offsets.len() * 2 + 1);
    let mut cursor = 0;

    for index in 0..set.offsets.len() {
        let Some(range) = set.match_range(text, index) else {
            continue;
        };
        // Overlap with the previous match: only the uncovered tail is emitted.
        let start = range.start.max(cursor);
        if range.end <= start {
            continue;
        }
        if start > cursor {
            segments.push(Segment::plain(&text[cursor..start]));
        }
        segments.push(Segment {
            text: &text[start..range.end],
            is_match: true,
            is_current: set.current == Some(index),
        });
        cursor = range.end;
    }

    if cursor < text.len() {
        segments.push(Segment::plain(&text[cursor..]));
    }
    segments
}

/// 1-based line and column (in chars) of a byte offset.
#[must_use]
pub fn line_and_column(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let before = text.get(..offset).unwrap_or(text);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

#[cfg(test)]
#[path = "matches_tests.rs"]
mod tests;
