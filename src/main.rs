//! callmark: show what `CALL(...)`-style markers in C sources stand for.
//!
//! Supports two modes:
//!
//! - **stdin mode**: `callmark < file.c`
//! - **file mode**: `callmark -f annotate src/*.c include/`
//!
//! Only C sources and headers are scanned unless `--cpp` is given.

use anyhow::{Context, Result};
use callmark::filetype::{Eligibility, Language};
use callmark::model::{Document, MarkerKind};
use callmark::render::{self, Renderer};
use callmark::scanner;
use clap::Parser;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "callmark",
    about = "Render CALL/NSCALL/MTD/NSMTD markers in C sources as readable call signatures"
)]
struct Cli {
    /// Input files, directories or glob patterns. If omitted, reads from stdin.
    files: Vec<String>,

    /// Output format: list (default), annotate, json
    #[arg(short = 'f', long, default_value = "list")]
    format: String,

    /// Declared language of stdin input: c, h or cpp
    #[arg(long, default_value = "c")]
    lang: Language,

    /// Also scan C++ sources (.cpp, .cc, .hpp, ...)
    #[arg(long)]
    cpp: bool,

    /// Only report these marker kinds. Can be specified multiple times.
    /// E.g. --only CALL --only NSCALL
    #[arg(long)]
    only: Vec<MarkerKind>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Pipeline configuration for [`process`].
struct RunConfig<'a> {
    eligibility: Eligibility,
    only: &'a [MarkerKind],
    /// Print `==> source <==` before each input
    headers: bool,
}

/// Scan one source and render its records. Kept separate from `main` for testing.
fn process(source: &str, text: &str, config: &RunConfig, renderer: &dyn Renderer) -> Result<String> {
    let doc = Document::from_text(text);
    let mut records = scanner::scan(&doc);
    if !config.only.is_empty() {
        records.retain(|r| config.only.contains(&r.kind));
    }
    tracing::info!("{}: {} markers", source, records.len());

    let mut output = String::new();
    if config.headers {
        output.push_str(&format!("==> {} <==\n", source));
    }
    output.push_str(&renderer.render(source, &doc, &records)?);
    Ok(output)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let renderer = render::create_renderer(&cli.format)?;
    let output = if cli.files.is_empty() {
        // stdin mode
        stdin_mode(&cli, renderer.as_ref())?
    } else {
        file_mode(&cli, renderer.as_ref())?
    };
    print!("{}", output);
    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .without_time()
        .with_target(false)
        .init();
}

/// stdin mode: the declared language comes from `--lang`.
fn stdin_mode(cli: &Cli, renderer: &dyn Renderer) -> Result<String> {
    let config = RunConfig {
        eligibility: Eligibility { permissive: cli.cpp },
        only: &cli.only,
        headers: false,
    };
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    if !config.eligibility.accepts(Some(cli.lang)) {
        tracing::warn!(
            "skipping <stdin>: not an eligible file type ({})",
            cli.lang.name()
        );
        return Ok(String::new());
    }
    process("<stdin>", &input, &config, renderer)
}

/// file mode: scan every eligible input, in sorted path order.
fn file_mode(cli: &Cli, renderer: &dyn Renderer) -> Result<String> {
    let eligibility = Eligibility { permissive: cli.cpp };
    let (input_files, skipped): (Vec<_>, Vec<_>) = expand_inputs(&cli.files, eligibility)?
        .into_iter()
        .partition(|p| eligibility.accepts_path(p));
    for path in &skipped {
        tracing::warn!("skipping {}: not an eligible file type", path.display());
    }
    let config = RunConfig {
        eligibility,
        only: &cli.only,
        headers: cli.format == "annotate" && input_files.len() > 1,
    };

    let mut output = String::new();
    for path in &input_files {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let source = path.to_string_lossy();
        output.push_str(&process(&source, &content, &config, renderer)?);
    }
    Ok(output)
}

/// Expand file, directory and glob arguments into a list of real file paths.
///
/// Directories are scanned non-recursively and contribute only eligible
/// files. Explicit files are kept whatever their type, so the caller can
/// warn about them.
fn expand_inputs(patterns: &[String], eligibility: Eligibility) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() && eligibility.accepts_path(&p) {
                    files.push(p);
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            tracing::warn!("no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}
