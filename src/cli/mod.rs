//! CLI layer: argument parsing, command dispatch, and subcommand implementations.

pub mod args;
mod serve;

pub use args::*;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vfs_viewer::container::LocalContainer;
use vfs_viewer::filter::{filter_references, FilterMode};
use vfs_viewer::matches::line_and_column;
use vfs_viewer::{format_file_size, Direction, FileReference, LoadError, Navigator, Segment, ViewerError};

/// Container id used by the one-shot commands.
const CLI_CONTAINER_ID: &str = "local";

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATETIME"), ")");

// ─── CLI ─────────────────────────────────────────────────────────────

/// File-content viewer for container file systems: in-document search, highlight, and result navigation
#[derive(Parser, Debug)]
#[command(name = "vfs-viewer", version = VERSION, about, after_help = "\
Run 'vfs-viewer <COMMAND> --help' for detailed options and examples.\n\
Common options: -d <DIR> (container directory), -f <PATTERN> (filter), -q <QUERY> (find)")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// List the files of a container (optionally filtered)
    List(ListArgs),

    /// Rank files by occurrences of a term in their content
    Search(SearchArgs),

    /// Print one file with find matches highlighted
    View(ViewArgs),

    /// Start the JSON-RPC tool server over stdio.
    Serve(ServeArgs),

    /// Show usage tips.
    Tips,
}

// ─── Main entry point ───────────────────────────────────────────────

pub fn run() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List(args) => {
            init_logging("warn", LogFormat::Text);
            cmd_list(args)
        }
        Commands::Search(args) => {
            init_logging("warn", LogFormat::Text);
            cmd_search(args)
        }
        Commands::View(args) => {
            init_logging("warn", LogFormat::Text);
            cmd_view(args)
        }
        Commands::Serve(args) => serve::cmd_serve(args),
        Commands::Tips => { print!("{}", crate::tips::render_cli()); Ok(()) },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `level`.
pub(crate) fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    // A second init (tests, repeated calls) is harmless; keep the first subscriber.
    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}

fn open_container(dir: &str, hidden: bool) -> Result<LocalContainer, ViewerError> {
    Ok(LocalContainer::open(dir, CLI_CONTAINER_ID)?.with_hidden(hidden))
}

fn filtered_files(
    container: &LocalContainer,
    filter: Option<&str>,
    regex: bool,
) -> Result<Vec<FileReference>, ViewerError> {
    let files = container.list_files()?;
    match filter {
        Some(pattern) => {
            let mode = if regex { FilterMode::Regex } else { FilterMode::Substring };
            filter_references(files, pattern, mode)
        }
        None => Ok(files),
    }
}

// ─── cmd_list ───────────────────────────────────────────────────────

fn cmd_list(args: ListArgs) -> Result<(), ViewerError> {
    let container = open_container(&args.dir, args.hidden)?;
    let files = filtered_files(&container, args.filter.as_deref(), args.regex)?;

    for (i, file) in files.iter().enumerate() {
        println!("{:4}  {:10}  {:24}  {}", i, format_file_size(file.size_bytes), file.mime_type, file.path);
    }
    eprintln!("{} file(s)", files.len());
    Ok(())
}

// ─── cmd_search ─────────────────────────────────────────────────────

fn cmd_search(args: SearchArgs) -> Result<(), ViewerError> {
    if args.query.trim().is_empty() {
        return Err(ViewerError::InvalidArgs("Search query must not be empty".to_string()));
    }
    let container = open_container(&args.dir, args.hidden)?;
    let results = container.search_contents(&args.query, args.max_results)?;

    for (i, item) in results.iter().enumerate() {
        println!(
            "{:4}  [{}]  {}",
            i,
            item.score.unwrap_or(0.0),
            item.reference.path
        );
        if let Some(ref snippet) = item.snippet {
            println!("        {}", snippet);
        }
    }
    eprintln!("{} file(s) contain '{}'", results.len(), args.query);
    Ok(())
}

// ─── cmd_view ───────────────────────────────────────────────────────

fn cmd_view(args: ViewArgs) -> Result<(), ViewerError> {
    let container = open_container(&args.dir, args.hidden)?;
    let files = filtered_files(&container, args.filter.as_deref(), args.regex)?;
    if files.is_empty() {
        return Err(ViewerError::InvalidArgs("No files to view".to_string()));
    }

    let mut navigator = Navigator::new();
    navigator.set_items_with(files, &container);
    navigator.select_index_with(args.index, &container)?;
    if let Some(ref query) = args.query {
        navigator.gate_mut().set_query(query);
    }

    let gate = navigator.gate();
    match gate.error() {
        Some(LoadError::Binary { mime_type }) => {
            eprintln!("{}", view_summary(&navigator));
            eprintln!("Binary file ({}): content not shown", mime_type);
            return Ok(());
        }
        Some(e) => return Err(e.clone().into()),
        None => {}
    }

    let count = gate.matches().map(|m| m.len()).unwrap_or(0);
    if count > 0 {
        if args.match_number == 0 || args.match_number > count {
            return Err(ViewerError::InvalidArgs(format!(
                "Match {} is out of range ({} match(es))",
                args.match_number, count
            )));
        }
        for _ in 1..args.match_number {
            navigator.gate_mut().advance_match(Direction::Next);
        }
    }

    let gate = navigator.gate();
    print!("{}", render_highlighted(&gate.segments(), !args.no_color));
    eprintln!("{}", view_summary(&navigator));
    Ok(())
}

/// Concatenate segments, marking matches with ANSI colors or text markers.
pub(crate) fn render_highlighted(segments: &[Segment<'_>], color: bool) -> String {
    let mut out = String::new();
    for segment in segments {
        match (segment.is_match, segment.is_current, color) {
            (false, _, _) => out.push_str(segment.text),
            (true, true, true) => out.push_str(&format!("\x1b[7m{}\x1b[0m", segment.text)),
            (true, false, true) => out.push_str(&format!("\x1b[1;33m{}\x1b[0m", segment.text)),
            (true, true, false) => out.push_str(&format!("[[{}]]", segment.text)),
            (true, false, false) => out.push_str(&format!("[{}]", segment.text)),
        }
    }
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// `"File 2 of 5: docs/a.md (1.5 KB, text/markdown) | 3 of 7 at line 4, column 2"`
pub(crate) fn view_summary(navigator: &Navigator) -> String {
    let gate = navigator.gate();
    let mut summary = navigator.position_label();
    if let Some(file) = gate.current() {
        summary.push_str(&format!(
            ": {} ({}, {})",
            file.path,
            format_file_size(file.size_bytes),
            file.mime_type
        ));
    }
    if let (Some(content), Some(set)) = (gate.content(), gate.matches()) {
        summary.push_str(&format!(" | {}", set.position_label()));
        if let Some(offset) = set.current_offset() {
            let (line, column) = line_and_column(&content.text, offset);
            summary.push_str(&format!(" at line {}, column {}", line, column));
        }
    }
    summary
}
