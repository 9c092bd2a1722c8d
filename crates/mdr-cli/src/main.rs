use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mdr_core::Renderer;

mod config;
mod parse;

use config::Config;

/// Columns assumed when the terminal size cannot be queried.
const FALLBACK_COLUMNS: u16 = 80;

/// Log level for tracing output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Most verbose: every traversal detail
    Trace,
    /// Verbose: widths, line counts, highlighter selection
    Debug,
    /// Standard: high-level flow
    Info,
    /// Quiet: only warnings and errors
    Warn,
    /// Minimal: only errors
    Error,
}

impl LogLevel {
    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Parser)]
#[command(name = "mdr")]
#[command(author, version, about = "Render markdown for the terminal", long_about = None)]
pub struct Cli {
    /// Markdown file to render (reads stdin when omitted)
    pub file: Option<PathBuf>,

    /// Total column width (defaults to the terminal width)
    #[arg(short, long)]
    pub width: Option<usize>,

    /// Left margin in columns (overrides config)
    #[arg(short, long)]
    pub margin: Option<usize>,

    /// Syntax highlighting theme (overrides config)
    #[arg(long)]
    pub theme: Option<String>,

    /// Disable syntax highlighting of code blocks
    #[arg(long)]
    pub no_highlight: bool,

    /// Leave :shortcode: emoji unexpanded
    #[arg(long)]
    pub no_emoji: bool,

    /// Print the parsed render tree as JSON instead of rendering
    #[arg(long)]
    pub dump_tree: bool,

    /// Print the number of rendered lines to stderr
    #[arg(long)]
    pub line_count: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Enable debug logging (shorthand for --log-level debug)
    #[arg(short, long)]
    pub debug: bool,

    /// Write logs to file (JSON-lines format)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // --debug overrides --log-level
    let log_level = if cli.debug {
        LogLevel::Debug
    } else {
        cli.log_level
    };
    init_logging(log_level, cli.log_file.as_deref())?;

    let mut config = Config::load()?;
    config.apply_cli(&cli);
    tracing::debug!(?config, "Loaded configuration");

    let source = read_source(cli.file.as_deref())?;
    let tree = parse::parse(&source);

    let mut stdout = std::io::stdout().lock();

    if cli.dump_tree {
        let json = serde_json::to_string_pretty(&tree).context("Failed to serialize tree")?;
        writeln!(stdout, "{}", json).context("Failed to write to stdout")?;
        return Ok(());
    }

    let columns = config.width.unwrap_or_else(terminal_columns);
    let line_width = text_width(columns, config.margin);
    tracing::debug!(columns, line_width, margin = config.margin, "Resolved layout");

    let renderer = Renderer::with_options(line_width, config.margin, config.render.clone());
    let rendered = renderer.render(&tree).context("Failed to render document")?;
    stdout
        .write_all(rendered.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to write to stdout")?;

    if cli.line_count {
        eprintln!("{}", rendered.line_count());
    }

    Ok(())
}

fn init_logging(level: LogLevel, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::new(level.as_filter());

    if let Some(log_path) = log_file {
        let file = std::fs::File::create(log_path)
            .with_context(|| format!("Failed to create log file: {:?}", log_path))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .init();
    } else {
        // stdout carries the document
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}

/// Read the document from `path`, or from stdin when it is piped.
fn read_source(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read stdin")?;
            Ok(source)
        }
        None => bail!("No input: pass a markdown file or pipe one on stdin (see --help)"),
    }
}

fn terminal_columns() -> usize {
    let columns = match crossterm::terminal::size() {
        Ok((columns, _)) if columns > 0 => columns,
        Ok(_) => FALLBACK_COLUMNS,
        Err(e) => {
            tracing::debug!(error = %e, "Terminal size unavailable");
            FALLBACK_COLUMNS
        }
    };
    usize::from(columns)
}

/// Text width handed to the renderer: one column is kept free at the right
/// edge, and the margin is subtracted.
fn text_width(columns: usize, margin: usize) -> usize {
    columns.saturating_sub(1 + margin)
}
