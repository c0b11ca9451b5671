use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use yansi::Paint;

use sx::buffer::Buffer;
use sx::handler::{Editor, Recorder};
use sx::range::Range;
use sx::trace::Logged;
use sx::{Config, Errors, Pipeline};

#[derive(Parser)]
#[command(name = "sx")]
#[command(
    about = "Structural regular expressions: select text with addresses and loops like x/re/, then edit or print it."
)]
struct Cli {
    /// Command to run, e.g. 'x/foo/ c/bar/'
    command: String,

    /// Files to process (standard input if none)
    files: Vec<PathBuf>,

    /// Run over START:END (rune offsets) instead of the whole buffer; repeatable
    #[arg(long = "select", value_name = "START:END", value_parser = parse_range)]
    select: Vec<Range>,

    /// Position used by the '.' address
    #[arg(long)]
    dot: Option<usize>,

    /// Fail if a stage finds more than this many matches
    #[arg(long = "max-matches", value_name = "N")]
    max_matches: Option<usize>,

    /// Log each stage's ranges to standard error
    #[arg(long)]
    trace: bool,

    /// Print the edit events as JSON instead of applying them
    #[arg(short = 'j', long = "json")]
    json: bool,
}

fn parse_range(s: &str) -> std::result::Result<Range, String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{}'", s))?;
    let start = start
        .parse::<usize>()
        .map_err(|e| format!("bad start '{}': {}", start, e))?;
    let end = end
        .parse::<usize>()
        .map_err(|e| format!("bad end '{}': {}", end, e))?;
    if end < start {
        return Err(format!("range {} ends before it starts", s));
    }
    Ok(Range::new(start, end))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = if cli.trace { "sx=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    let mut config = Config::default();
    if let Some(dot) = cli.dot {
        config = config.with_dot(dot);
    }
    if let Some(max) = cli.max_matches {
        config = config.with_max_matches(max);
    }
    if cli.trace {
        config = config.with_tracer(Logged);
    }

    let pipeline = match Pipeline::from_command(&cli.command, config) {
        Ok(p) => p,
        Err(errors) => {
            eprint!("{}", format_errors(&cli.command, &errors));
            std::process::exit(1);
        }
    };

    let inputs = read_inputs(&cli.files)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for (name, bytes) in inputs {
        let ranges = if cli.select.is_empty() {
            vec![Buffer::from_bytes(&bytes).full()]
        } else {
            cli.select.clone()
        };

        if cli.json {
            let mut recorder = Recorder::new();
            pipeline
                .execute(&bytes, &ranges, &mut recorder)
                .with_context(|| format!("running on {}", name))?;
            serde_json::to_writer_pretty(&mut handle, &recorder.events)?;
            writeln!(handle)?;
            continue;
        }

        let mut editor = Editor::new(Buffer::from_bytes(&bytes));
        pipeline
            .execute(&bytes, &ranges, &mut editor)
            .with_context(|| format!("running on {}", name))?;
        let (buffer, output) = editor
            .finish()
            .with_context(|| format!("applying edits to {}", name))?;
        if output.is_empty() {
            write!(handle, "{}", buffer)?;
        } else {
            for line in output {
                writeln!(handle, "{}", line)?;
            }
        }
    }
    Ok(())
}

/// Each file's contents, or standard input's when no files are named.
fn read_inputs(files: &[PathBuf]) -> Result<Vec<(String, Vec<u8>)>> {
    if files.is_empty() {
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .context("reading standard input")?;
        return Ok(vec![("standard input".to_string(), bytes)]);
    }
    files
        .iter()
        .map(|path| {
            let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            Ok((path.display().to_string(), bytes))
        })
        .collect()
}

/// Render each error with the command and a caret under its position.
fn format_errors(command: &str, errors: &Errors) -> String {
    let mut out = String::new();
    for err in errors.iter() {
        let message = match err.position {
            Some(_) => err.message.clone(),
            None => err.to_string(),
        };
        out.push_str(&format!("{}: {}\n", "error".red().bold(), message));
        if let Some(pos) = err.position {
            let offset = pos.saturating_sub(1);
            out.push_str(&format!(
                "  {}\n  {}{}\n",
                command,
                " ".repeat(offset),
                "^".red()
            ));
        }
    }
    out
}
