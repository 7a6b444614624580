//! CLI binary for pdf2quiz.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `GenerationConfig` and prints results.

use anyhow::{bail, Context, Result};
use clap::Parser;
use pdf2quiz::{DetailLevel, Document, GenerationConfig, PageRange, QuizBuilder};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI definition ───────────────────────────────────────────────────────────

/// Generate a question/answer study set from a PDF book.
#[derive(Parser, Debug)]
#[command(name = "pdf2quiz", version, about)]
struct Cli {
    /// Path to the PDF book.
    input: PathBuf,

    /// Detail level: basic (9 pages/call), intermediate (5), detailed (3).
    #[arg(short, long, default_value = "intermediate")]
    detail: String,

    /// First page of the range to cover (1-based, inclusive).
    #[arg(long, requires = "to")]
    from: Option<usize>,

    /// Last page of the range to cover (1-based, inclusive).
    #[arg(long, requires = "from")]
    to: Option<usize>,

    /// Title used in the artifact filename. Defaults to the input file stem.
    #[arg(short, long)]
    title: Option<String>,

    /// Directory artifacts are written into.
    #[arg(long, default_value = "artifacts")]
    artifact_dir: PathBuf,

    /// Model identifier for generation and token counting.
    #[arg(short, long, default_value = "gemini-1.5-flash")]
    model: String,

    /// API key. Falls back to the GEMINI_API_KEY environment variable.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Maximum tokens a single chunk prompt may measure.
    #[arg(long, default_value_t = 30_000)]
    max_prompt_tokens: usize,

    /// Minimum seconds between generation calls.
    #[arg(long, default_value_t = 4)]
    interval_secs: u64,

    /// Verbose logging (same as RUST_LOG=pdf2quiz=debug).
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "pdf2quiz=debug"
    } else {
        "pdf2quiz=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with_writer(std::io::stderr)
        .init();

    let detail = DetailLevel::from_str(&cli.detail)
        .with_context(|| format!("invalid --detail '{}'", cli.detail))?;

    let range = match (cli.from, cli.to) {
        (Some(from), Some(to)) => Some(PageRange::new(from, to)),
        (None, None) => None,
        // clap's `requires` already enforces the pairing; belt and braces.
        _ => bail!("--from and --to must be given together"),
    };

    let title = cli.title.clone().unwrap_or_else(|| {
        cli.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "book".to_string())
    });

    let mut builder = GenerationConfig::builder()
        .model(&cli.model)
        .max_prompt_tokens(cli.max_prompt_tokens)
        .min_call_interval(Duration::from_secs(cli.interval_secs))
        .artifact_dir(&cli.artifact_dir);
    if let Some(key) = &cli.api_key {
        builder = builder.api_key(key);
    }
    let config = builder.build()?;

    let quiz = QuizBuilder::new(config)?;
    let document = Document::open(&cli.input)
        .await
        .with_context(|| format!("failed to open '{}'", cli.input.display()))?;

    eprintln!(
        "{} {} ({} pages, detail={})",
        bold("Generating questions for"),
        cli.input.display(),
        document.page_count(),
        detail
    );

    let artifact = quiz
        .generate_to_artifact(&document, &title, detail, range)
        .await?;

    let stats = &artifact.output.stats;
    eprintln!(
        "{} {} chunks, {} calls, {} prompt tokens, {:.1}s",
        green("✓"),
        stats.chunk_count,
        stats.generation_calls,
        stats.total_prompt_tokens,
        stats.total_duration_ms as f64 / 1000.0
    );
    eprintln!(
        "{}",
        dim(&format!(
            "artifact root: {}",
            cli.artifact_dir.display()
        ))
    );

    // The relative path is the artifact reference; print it on stdout so
    // scripts can capture it.
    println!("{}", artifact.relative_path.display());

    Ok(())
}
