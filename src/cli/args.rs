//! CLI argument structs for all subcommands.

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(after_long_help = r#"EXAMPLES:
  All files:       vfs-viewer list -d ./docs
  Keyword filter:  vfs-viewer list -d ./docs --filter report
  Regex filter:    vfs-viewer list -d . --filter "\.(md|txt)$" --regex
  Dot-files too:   vfs-viewer list -d . --hidden

NOTES:
  - The filter matches file name, path and mime type, case-insensitively
  - .gitignore rules are honored even outside a git repository
"#)]
pub struct ListArgs {
    /// Container directory
    #[arg(short, long, default_value = ".")]
    pub dir: String,

    /// Keep only files whose name, path or mime type contains this pattern
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Treat the filter as a regular expression
    #[arg(short, long)]
    pub regex: bool,

    /// Include hidden files
    #[arg(long)]
    pub hidden: bool,
}

#[derive(Parser, Debug)]
#[command(after_long_help = r#"EXAMPLES:
  Rank by content: vfs-viewer search "timeout" -d ./logs
  Top 5 only:      vfs-viewer search "timeout" -d ./logs --max-results 5

NOTES:
  - Score is the number of case-insensitive (overlapping) occurrences
  - Binary files are never searched
"#)]
pub struct SearchArgs {
    /// Term to look for in file contents
    pub query: String,

    /// Container directory
    #[arg(short, long, default_value = ".")]
    pub dir: String,

    /// Maximum results to display (0 = unlimited)
    #[arg(long, default_value = "20")]
    pub max_results: usize,

    /// Include hidden files
    #[arg(long)]
    pub hidden: bool,
}

#[derive(Parser, Debug)]
#[command(after_long_help = r#"EXAMPLES:
  First file:          vfs-viewer view -d ./docs
  Third match of term: vfs-viewer view -d ./docs --query needle --match 3
  Filtered list:       vfs-viewer view -d . --filter guide --index 1 --query todo
  Plain markers:       vfs-viewer view -d . --query todo --no-color

OUTPUT:
  Matches are highlighted (current match in reverse video). With --no-color
  the current match is wrapped in [[...]] and other matches in [...].
"#)]
pub struct ViewArgs {
    /// Container directory
    #[arg(short, long, default_value = ".")]
    pub dir: String,

    /// Filter the file list before picking an index
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Treat the filter as a regular expression
    #[arg(short, long)]
    pub regex: bool,

    /// 0-based index into the (filtered) file list
    #[arg(short, long, default_value = "0")]
    pub index: usize,

    /// Term to highlight
    #[arg(short, long)]
    pub query: Option<String>,

    /// 1-based match to mark as current
    #[arg(short = 'm', long = "match", default_value = "1")]
    pub match_number: usize,

    /// Use text markers instead of ANSI colors
    #[arg(long)]
    pub no_color: bool,

    /// Include hidden files
    #[arg(long)]
    pub hidden: bool,
}

/// Log line format on stderr.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(after_long_help = r#"WHAT IS THIS:
  A JSON-RPC 2.0 tool server over stdio. A client (an editor panel, an agent,
  a test harness) sends one request per line on stdin and reads one response
  per line on stdout. The server holds one viewer session: a result list, a
  cursor into it, the open file and the active find query.

EXAMPLES:
  Basic:           vfs-viewer serve --dir ./docs
  Named container: vfs-viewer serve --dir ./docs --container handbook
  With watcher:    vfs-viewer serve --dir ./docs --watch
  JSON logs:       vfs-viewer serve --dir . --log-level debug --log-format json

CLIENT CONFIGURATION (mcp.json):
  {
    "servers": {
      "vfs-viewer": {
        "command": "vfs-viewer",
        "args": ["serve", "--dir", "/srv/docs", "--watch"]
      }
    }
  }

AVAILABLE TOOLS:
  viewer_list          -- List files (optional keyword/regex filter)
  viewer_search_files  -- Rank files by occurrences of a term
  viewer_open          -- Open the file at an index of the result list
  viewer_step          -- Open the next/previous file (wraps around)
  viewer_reload        -- Re-open the current file (retry a failed load)
  viewer_close         -- Close the open file and clear the find query
  viewer_find          -- Set the in-file find query
  viewer_find_step     -- Move to the next/previous match (wraps around)
  viewer_view          -- Highlighted text of the open file
  viewer_status        -- Current file, load state, match position
  viewer_save          -- Replace the open file's content (atomic)
  viewer_delete        -- Delete the open file
  viewer_help          -- Usage tips

NOTES:
  - Logging goes to stderr (never pollutes JSON-RPC on stdout)
  - RUST_LOG overrides --log-level
  - With --watch, file changes refresh the result list; the open file stays
    open as long as it still exists
"#)]
pub struct ServeArgs {
    /// Container directory to serve.
    #[arg(short, long, default_value = ".")]
    pub dir: String,

    /// Container id reported in file references.
    #[arg(long, default_value = "local")]
    pub container: String,

    /// Include hidden files.
    #[arg(long)]
    pub hidden: bool,

    /// Watch for file changes and refresh the result list.
    #[arg(long)]
    pub watch: bool,

    /// Debounce delay in ms for file watcher.
    #[arg(long, default_value = "500")]
    pub debounce_ms: u64,

    /// Log level for stderr output (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log line format for stderr output.
    #[arg(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Maximum response size in KB before truncation (0 = no limit, default: 32).
    #[arg(long, default_value = "32")]
    pub max_response_kb: usize,
}
