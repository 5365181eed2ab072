//! Viewer session: one container, its current result list, and the navigator
//! that walks it. Shared by the CLI, the tool server, and the file watcher.

use serde_json::{json, Value};
use tracing::info;

use vfs_viewer::container::LocalContainer;
use vfs_viewer::filter::{filter_references, FilterMode};
use vfs_viewer::matches::line_and_column;
use vfs_viewer::{
    format_file_size, language_for_mime, Direction, FileReference, Navigator, ResultItem, ViewerError,
};

/// How the current result list was produced. Re-run on refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum ListSource {
    /// Every file in the container
    All,
    /// Keyword (or regex) filter on name, path and mime type
    Filter { pattern: String, mode: FilterMode },
    /// Files ranked by occurrences of a term in their content
    ContentSearch { query: String, max_results: usize },
}

impl ListSource {
    fn describe(&self) -> Value {
        match self {
            ListSource::All => json!({ "type": "all" }),
            ListSource::Filter { pattern, mode } => json!({
                "type": "filter",
                "pattern": pattern,
                "regex": *mode == FilterMode::Regex,
            }),
            ListSource::ContentSearch { query, max_results } => json!({
                "type": "contentSearch",
                "query": query,
                "maxResults": max_results,
            }),
        }
    }
}

pub struct ViewerSession {
    container: LocalContainer,
    navigator: Navigator,
    items: Vec<ResultItem>,
    source: ListSource,
}

impl ViewerSession {
    /// A session with an empty result list.
    pub fn new(container: LocalContainer) -> Self {
        Self {
            container,
            navigator: Navigator::new(),
            items: Vec::new(),
            source: ListSource::All,
        }
    }

    pub fn container(&self) -> &LocalContainer {
        &self.container
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn items(&self) -> &[ResultItem] {
        &self.items
    }

    // ─── Result list ─────────────────────────────────────────────────

    /// Produce a new result list from `source` and hand it to the navigator.
    pub fn load(&mut self, source: ListSource) -> Result<(), ViewerError> {
        let items: Vec<ResultItem> = match &source {
            ListSource::All => self.container.list_files()?.into_iter().map(ResultItem::from).collect(),
            ListSource::Filter { pattern, mode } => {
                filter_references(self.container.list_files()?, pattern, *mode)?
                    .into_iter()
                    .map(ResultItem::from)
                    .collect()
            }
            ListSource::ContentSearch { query, max_results } => self.container.search_contents(query, *max_results)?,
        };

        let references: Vec<FileReference> = items.iter().map(|i| i.reference.clone()).collect();
        info!(items = items.len(), source = ?source, "Result list replaced");
        self.items = items;
        self.source = source;
        self.navigator.set_items_with(references, &self.container);
        Ok(())
    }

    /// Re-run the current source. The open file stays open if it is still listed.
    pub fn refresh(&mut self) -> Result<(), ViewerError> {
        self.load(self.source.clone())
    }

    // ─── Navigation ──────────────────────────────────────────────────

    pub fn select(&mut self, index: usize) -> Result<(), ViewerError> {
        self.navigator.select_index_with(index, &self.container)?;
        Ok(())
    }

    pub fn step(&mut self, direction: Direction) {
        self.navigator.step_with(direction, &self.container);
    }

    /// Re-open the current file (retry after a failed load).
    pub fn reload(&mut self) -> Result<(), ViewerError> {
        if self.navigator.current().is_none() {
            return Err(ViewerError::NoOpenFile);
        }
        self.navigator.reload_with(&self.container);
        Ok(())
    }

    /// Close the open file and clear the query. The result list stays.
    pub fn close(&mut self) {
        self.navigator.gate_mut().close();
    }

    // ─── In-file search ──────────────────────────────────────────────

    pub fn set_query(&mut self, query: &str) {
        self.navigator.gate_mut().set_query(query);
    }

    pub fn find_step(&mut self, direction: Direction) {
        self.navigator.gate_mut().advance_match(direction);
    }

    // ─── Mutation ────────────────────────────────────────────────────

    /// Replace the open file's text, then reload it. The query is kept.
    pub fn save(&mut self, text: &str) -> Result<(), ViewerError> {
        let reference = self.open_text_file()?.clone();
        self.container.replace_content(&reference.file_id, text)?;
        self.navigator.reload_with(&self.container);
        Ok(())
    }

    /// Delete the open file and refresh the result list.
    pub fn delete_current(&mut self) -> Result<FileReference, ViewerError> {
        let reference = self.navigator.gate().current().cloned().ok_or(ViewerError::NoOpenFile)?;
        self.container.delete_file(&reference.file_id)?;
        self.refresh()?;
        Ok(reference)
    }

    fn open_text_file(&self) -> Result<&FileReference, ViewerError> {
        let gate = self.navigator.gate();
        match (gate.current(), gate.content()) {
            (Some(reference), Some(_)) => Ok(reference),
            (Some(_), None) => match gate.error() {
                Some(e) => Err(e.clone().into()),
                None => Err(ViewerError::NoOpenFile),
            },
            (None, _) => Err(ViewerError::NoOpenFile),
        }
    }

    // ─── JSON views ──────────────────────────────────────────────────

    pub fn list_json(&self) -> Value {
        let files: Vec<Value> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let mut obj = reference_json(&item.reference);
                obj["index"] = json!(i);
                if let Some(score) = item.score {
                    obj["score"] = json!(score);
                }
                if let Some(ref snippet) = item.snippet {
                    obj["snippet"] = json!(snippet);
                }
                obj
            })
            .collect();

        json!({
            "files": files,
            "summary": {
                "total": self.items.len(),
                "source": self.source.describe(),
                "position": self.navigator.position_label(),
            }
        })
    }

    pub fn status_json(&self) -> Value {
        let gate = self.navigator.gate();
        let cursor = self.navigator.cursor();

        let error = gate.error().map(|e| {
            json!({
                "kind": e.kind(),
                "message": e.to_string(),
                "retryable": e.is_retryable(),
            })
        });

        let content = gate.content().map(|c| {
            json!({
                "encoding": c.encoding,
                "sizeBytes": c.size_bytes,
                "lines": c.text.lines().count(),
            })
        });

        let matches = match (gate.content(), gate.matches()) {
            (Some(content), Some(set)) => {
                let mut obj = json!({
                    "query": set.query,
                    "count": set.len(),
                    "label": set.position_label(),
                });
                if let Some(offset) = set.current_offset() {
                    let (line, column) = line_and_column(&content.text, offset);
                    obj["current"] = json!(set.current.map(|i| i + 1));
                    obj["line"] = json!(line);
                    obj["column"] = json!(column);
                }
                Some(obj)
            }
            _ => None,
        };

        json!({
            "container": self.container.id(),
            "position": cursor.position_label(),
            "index": cursor.index(),
            "total": cursor.len(),
            "source": self.source.describe(),
            "file": gate.current().map(reference_json),
            "loading": gate.is_loading(),
            "error": error,
            "content": content,
            "query": gate.query(),
            "searchable": gate.can_search(),
            "matches": matches,
        })
    }

    /// Highlight segments of the open file, limited to `max_segments` (0 = all).
    pub fn view_json(&self, max_segments: usize) -> Result<Value, ViewerError> {
        let reference = self.open_text_file()?;
        let gate = self.navigator.gate();
        let segments = gate.segments();
        let total = segments.len();
        let limit = if max_segments == 0 { total } else { max_segments.min(total) };

        let shown: Vec<Value> = segments[..limit]
            .iter()
            .map(|s| json!({ "text": s.text, "match": s.is_match, "current": s.is_current }))
            .collect();

        let mut output = json!({
            "file": reference_json(reference),
            "segments": shown,
            "summary": {
                "segments": total,
                "query": gate.query(),
                "matches": gate.matches().map(|m| m.position_label()),
            }
        });
        if limit < total {
            output["summary"]["truncated"] = json!(true);
            output["summary"]["shownSegments"] = json!(limit);
        }
        Ok(output)
    }
}

pub(crate) fn reference_json(reference: &FileReference) -> Value {
    json!({
        "fileId": reference.file_id,
        "path": reference.path,
        "name": reference.name(),
        "mimeType": reference.mime_type,
        "kind": reference.kind(),
        "language": language_for_mime(&reference.mime_type),
        "sizeBytes": reference.size_bytes,
        "size": format_file_size(reference.size_bytes),
    })
}
