//! Single source of truth for usage tips.
//! Used by: CLI `vfs-viewer tips`, the `viewer_help` tool, and the server `instructions` field.

use serde_json::{json, Value};

/// A single usage tip.
pub struct Tip {
    pub rule: &'static str,
    pub why: &'static str,
    pub example: &'static str,
}

/// Tool priority entry.
pub struct ToolPriority {
    pub rank: u8,
    pub tool: &'static str,
    pub description: &'static str,
}

/// A recipe for a common viewing task.
pub struct Strategy {
    pub name: &'static str,
    pub when: &'static str,
    pub steps: &'static [&'static str],
    pub anti_patterns: &'static [&'static str],
}

// ─── Single source of truth ─────────────────────────────────────────

pub fn tips() -> Vec<Tip> {
    vec![
        Tip {
            rule: "Build a result list before opening files",
            why: "viewer_open and viewer_step navigate the current result list. viewer_list (all files or a keyword filter) or viewer_search_files (content-ranked) replaces it.",
            example: "vfs-viewer list -d ./docs --filter report  |  tool: viewer_list filter='report'",
        },
        Tip {
            rule: "The find query survives navigation",
            why: "A query set with viewer_find is re-applied to every file opened with viewer_step or viewer_open, so one term can be followed across the whole result list. viewer_close clears it.",
            example: "viewer_find query='timeout', then viewer_step direction='next' repeatedly",
        },
        Tip {
            rule: "Matching is case-insensitive and overlapping",
            why: "Searching 'aa' in 'aaa' reports two matches (offsets 0 and 1). Highlighted segments keep the file's original casing.",
            example: "vfs-viewer view -d . --query aa --no-color",
        },
        Tip {
            rule: "Stepping wraps around at both ends",
            why: "viewer_step and viewer_find_step move past the last item back to the first (and the other way round), so there is never a dead end.",
            example: "viewer_find_step direction='previous' on the first match jumps to the last match",
        },
        Tip {
            rule: "Binary files are metadata-only",
            why: "Images, archives and other non-text mime types are never fetched. Status shows their size and type; search is disabled while one is open.",
            example: "viewer_status after opening logo.png reports error kind 'Binary'",
        },
        Tip {
            rule: "Retry failed loads with viewer_reload",
            why: "A failed load is recorded, not retried. viewer_reload re-opens the current file and keeps the query.",
            example: "viewer_status shows error.retryable=true, then viewer_reload",
        },
        Tip {
            rule: "Regex filters are case-insensitive",
            why: "With regex=true the filter pattern is compiled with (?i) and tested against name, path and mime type. Invalid patterns are reported as errors.",
            example: "vfs-viewer list -d . --filter '\\.(md|txt)$' --regex  |  tool: viewer_list filter='\\.(md|txt)$', regex=true",
        },
        Tip {
            rule: "Saving is atomic",
            why: "viewer_save writes to a temporary file next to the target and renames it into place, then reloads the file. A failed save never leaves a half-written file.",
            example: "viewer_save content='new text'",
        },
    ]
}

pub fn strategies() -> Vec<Strategy> {
    vec![
        Strategy {
            name: "Review Every Occurrence",
            when: "User asks 'where is X mentioned' across a set of documents",
            steps: &[
                "Step 1 - Rank files (1 call): viewer_search_files query='X' -> files ordered by number of occurrences",
                "Step 2 - Set the term once (1 call): viewer_find query='X' -> active for every file you open next",
                "Step 3 - Walk the results: viewer_view for the current file, viewer_step direction='next' for the next one",
            ],
            anti_patterns: &[
                "Don't call viewer_find again after each step -- the query is carried over automatically",
                "Don't use viewer_close between files -- it clears the query",
            ],
        },
        Strategy {
            name: "Edit a Document",
            when: "User wants to change the contents of one file",
            steps: &[
                "Step 1 - Locate (1 call): viewer_list filter='<name>' -> result list containing the file",
                "Step 2 - Open and read (2 calls): viewer_open index=N, viewer_view",
                "Step 3 - Save (1 call): viewer_save content='<full new text>' -> atomic replace and reload",
            ],
            anti_patterns: &[
                "Don't send partial content to viewer_save -- it replaces the whole file",
            ],
        },
    ]
}

pub fn tool_priority() -> Vec<ToolPriority> {
    vec![
        ToolPriority { rank: 1, tool: "viewer_status", description: "where am I: current file, loading/error state, match position" },
        ToolPriority { rank: 2, tool: "viewer_search_files", description: "content-ranked result list (match counts + snippets)" },
        ToolPriority { rank: 3, tool: "viewer_list", description: "all files or keyword/regex filter on name, path, mime" },
        ToolPriority { rank: 4, tool: "viewer_find", description: "in-file search with highlight, carried across files" },
        ToolPriority { rank: 5, tool: "viewer_view", description: "highlighted text of the open file" },
    ]
}

// ─── Renderers ──────────────────────────────────────────────────────

/// Render tips as human-readable CLI output.
pub fn render_cli() -> String {
    let mut out = String::new();
    out.push_str("\nvfs-viewer -- Usage Tips\n");
    out.push_str("========================\n\n");

    out.push_str("TIPS\n");
    out.push_str("----\n");
    for (i, tip) in tips().iter().enumerate() {
        out.push_str(&format!("{:2}. {}\n", i + 1, tip.rule));
        out.push_str(&format!("    Why: {}\n", tip.why));
        out.push_str(&format!("    Example: {}\n\n", tip.example));
    }

    out.push_str("RECIPES\n");
    out.push_str("-------\n");
    for strat in strategies() {
        out.push_str(&format!("  [{}]\n", strat.name));
        out.push_str(&format!("  When: {}\n", strat.when));
        for step in strat.steps {
            out.push_str(&format!("    - {}\n", step));
        }
        out.push_str("  Anti-patterns:\n");
        for ap in strat.anti_patterns {
            out.push_str(&format!("    X {}\n", ap));
        }
        out.push('\n');
    }

    out.push_str("TOOL PRIORITY (serve)\n");
    out.push_str("---------------------\n");
    for tp in tool_priority() {
        out.push_str(&format!("  {}. {:20} - {}\n", tp.rank, tp.tool, tp.description));
    }
    out.push('\n');

    out
}

/// Render tips as JSON for the `viewer_help` tool.
pub fn render_json() -> Value {
    let tips: Vec<Value> = tips().iter().map(|t| {
        json!({
            "rule": t.rule,
            "why": t.why,
            "example": t.example,
        })
    }).collect();

    let recipes: Vec<Value> = strategies().iter().map(|s| {
        json!({
            "name": s.name,
            "when": s.when,
            "steps": s.steps,
            "antiPatterns": s.anti_patterns,
        })
    }).collect();

    let priority: Vec<Value> = tool_priority().iter().map(|tp| {
        json!(format!("{}. {} - {}", tp.rank, tp.tool, tp.description))
    }).collect();

    json!({
        "tips": tips,
        "recipes": recipes,
        "toolPriority": priority,
    })
}

/// Render tips as compact text for the `initialize` instructions field.
pub fn render_instructions() -> String {
    let mut out = String::new();
    out.push_str("vfs-viewer tool server: browse, search and edit the files of one container.\n\n");

    for (i, tip) in tips().iter().enumerate() {
        out.push_str(&format!("{}. {}: {}\n", i + 1, tip.rule.to_uppercase(), tip.why));
    }

    out.push_str("\nRECIPES:\n");
    for strat in strategies() {
        out.push_str(&format!("  [{}] {}\n", strat.name, strat.when));
        for step in strat.steps {
            out.push_str(&format!("    - {}\n", step));
        }
    }

    out.push_str("\nTOOL PRIORITY:\n");
    for tp in tool_priority() {
        out.push_str(&format!("  {}. {} - {}\n", tp.rank, tp.tool, tp.description));
    }
    out.push_str("\nCall viewer_help for a detailed JSON guide with examples.\n");

    out
}
