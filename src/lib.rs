//! # pdf2quiz
//!
//! Generate question/answer study sets from PDF books using LLMs.
//!
//! ## Why this crate?
//!
//! Feeding a whole book to a generation API fails twice over: the prompt
//! blows the model's context budget, and free-tier APIs throttle requests
//! hard enough that naive call loops get 429s. This crate turns an
//! arbitrarily large PDF into a sequence of bounded-size prompts, gates each
//! one against a token budget, serialises the calls through a process-wide
//! rate gate, and assembles the partial outputs into one clean
//! `question;answer` document.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Extract   pull each page's text layer via pdfium (spawn_blocking)
//!  ├─ 2. Plan      group pages into chunks per detail level (9/5/3 pages)
//!  ├─ 3. Budget    measure each chunk prompt, fail closed on counter errors
//!  ├─ 4. Generate  rate-limited calls to the generation API, in chunk order
//!  ├─ 5. Sanitise  normalise output into delimited question;answer lines
//!  └─ 6. Persist   write the artifact under a unique name, return its path
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2quiz::{Document, DetailLevel, GenerationConfig, QuizBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from GEMINI_API_KEY
//!     let config = GenerationConfig::default();
//!     let builder = QuizBuilder::new(config)?;
//!
//!     let document = Document::open("textbook.pdf").await?;
//!     let artifact = builder
//!         .generate_to_artifact(&document, "textbook", DetailLevel::Intermediate, None)
//!         .await?;
//!     println!("written: {}", artifact.relative_path.display());
//!     eprintln!(
//!         "{} chunks, {} calls",
//!         artifact.output.stats.chunk_count,
//!         artifact.output.stats.generation_calls
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Choosing a Detail Level
//!
//! | Level | Pages per call | Calls for a 90-page book |
//! |-------|---------------|--------------------------|
//! | `basic` | 9 | 10 |
//! | `intermediate` | 5 | 18 |
//! | `detailed` | 3 | 30 |
//!
//! Finer levels ask about less text per call, so questions go deeper — and
//! with the default 4-second gate a `detailed` run over a long book takes
//! minutes by design. There is no per-request way around the gate: it exists
//! to keep the process as a whole under the API's rate limit.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2quiz` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2quiz = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod artifact;
pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod provider;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use artifact::ArtifactWriter;
pub use config::{DetailLevel, GenerationConfig, GenerationConfigBuilder, PageRange};
pub use error::Pdf2QuizError;
pub use generate::{GeneratedArtifact, QuizBuilder};
pub use output::{AnswerSetOutput, ChunkRecord, GenerationStats};
pub use pipeline::budget::{TokenBudget, TokenCounter};
pub use pipeline::extract::Document;
pub use pipeline::llm::{RateGate, RateLimitedGenerator, TextGenerator};
pub use pipeline::plan::{Chunk, ChunkPlan};
pub use provider::GeminiProvider;
