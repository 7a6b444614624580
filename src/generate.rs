//! Question-set orchestration: the full plan → budget → generate → assemble
//! loop for one document.
//!
//! ## Why strictly serial?
//!
//! Chunks are never submitted in parallel: every generation call must pass
//! the shared [`RateGate`], and interleaving chunks from one request buys
//! nothing when the gate spaces all calls anyway. Serial processing also
//! keeps output assembly trivial — chunk outputs are appended in plan order.
//!
//! ## Budget policy
//!
//! In a multi-chunk plan every chunk's prompt is measured before its call;
//! an over-budget chunk aborts the whole request with no artifact written.
//! An earlier revision of this logic fell back to a smaller chunk size
//! mid-flight instead — rejected: the output would mix detail levels, which
//! is not a coherent result. Single-chunk plans skip the check; their only
//! failure mode is the generation API itself rejecting the prompt, which
//! surfaces as a plain generation error.

use crate::artifact::ArtifactWriter;
use crate::config::{DetailLevel, GenerationConfig, PageRange};
use crate::error::Pdf2QuizError;
use crate::output::{AnswerSetOutput, ChunkRecord, GenerationStats};
use crate::pipeline::budget::{TokenBudget, TokenCounter};
use crate::pipeline::extract::Document;
use crate::pipeline::llm::{RateGate, RateLimitedGenerator, TextGenerator};
use crate::pipeline::plan::{Chunk, ChunkPlan};
use crate::pipeline::sanitize;
use crate::prompts::{self, INSTRUCTION_PREFIX, NO_TEXT_FALLBACK};
use crate::provider::GeminiProvider;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// A persisted answer set: where it landed plus the full run output.
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    /// Path of the artifact file, relative to the configured artifact root.
    pub relative_path: PathBuf,
    /// The run output that was persisted.
    pub output: AnswerSetOutput,
}

/// Drives question-set generation end to end.
///
/// Construct **one per process** and share it: the rate gate inside is the
/// process-wide clock that spaces generation calls across all concurrent
/// requests. Building a second `QuizBuilder` creates a second, independent
/// gate — two gates can fire within one interval window.
pub struct QuizBuilder {
    config: GenerationConfig,
    budget: TokenBudget,
    generator: RateLimitedGenerator,
    writer: ArtifactWriter,
}

impl QuizBuilder {
    /// Build with the production Gemini provider from `config`.
    pub fn new(config: GenerationConfig) -> Result<Self, Pdf2QuizError> {
        let provider = Arc::new(GeminiProvider::new(&config)?);
        Ok(Self::with_backends(
            config,
            Arc::clone(&provider) as Arc<dyn TextGenerator>,
            provider as Arc<dyn TokenCounter>,
        ))
    }

    /// Build with injected generation and counting backends.
    ///
    /// This is the seam tests use: scripted generators and counters go in
    /// here, and nothing below this constructor touches the network.
    pub fn with_backends(
        config: GenerationConfig,
        generator: Arc<dyn TextGenerator>,
        counter: Arc<dyn TokenCounter>,
    ) -> Self {
        let gate = Arc::new(RateGate::new(config.min_call_interval));
        let budget = TokenBudget::new(counter, &config.model, config.max_prompt_tokens);
        let generator = RateLimitedGenerator::new(generator, gate);
        let writer = ArtifactWriter::new(&config.artifact_dir);
        Self {
            config,
            budget,
            generator,
            writer,
        }
    }

    /// The configuration this builder runs with.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate the answer set for `document` at `level` over `range`
    /// (whole document when `None`).
    ///
    /// # Errors
    /// - [`Pdf2QuizError::InvalidPageRange`] / [`Pdf2QuizError::PageOutOfRange`]
    ///   before any chunking or generation work
    /// - [`Pdf2QuizError::TokenLimitExceeded`] when a chunk in a multi-chunk
    ///   plan is over budget (the whole request aborts)
    /// - [`Pdf2QuizError::GenerationFailed`] when the generation service fails
    pub async fn build_answer_set(
        &self,
        document: &Document,
        level: DetailLevel,
        range: Option<PageRange>,
    ) -> Result<AnswerSetOutput, Pdf2QuizError> {
        let total_start = Instant::now();
        info!(
            "Starting question-set generation: {} pages, detail={}",
            document.page_count(),
            level
        );

        // ── Step 1: Plan chunks ──────────────────────────────────────────
        let plan = ChunkPlan::new(document.page_count(), level, range)?;
        let multi_chunk = plan.len() > 1;
        debug!(
            "Planned {} chunk(s) of up to {} pages over span {}",
            plan.len(),
            level.chunk_size(),
            plan.span()
        );

        // ── Step 2: Sentinel for spans with no text layer ────────────────
        // Checked before any generation call: a scanned-image book yields a
        // fixed fallback message as a successful result, never an error.
        let span = plan.span();
        let has_text = (span.start..=span.end)
            .any(|p| document.page_text(p).is_some_and(|t| !t.trim().is_empty()));
        if !has_text {
            info!(
                "No extractable text in pages {}; returning fallback message",
                span
            );
            return Ok(AnswerSetOutput {
                text: NO_TEXT_FALLBACK.to_string(),
                chunks: Vec::new(),
                stats: GenerationStats {
                    page_count: document.page_count(),
                    requested_pages: plan.page_total(),
                    chunk_count: plan.len(),
                    generation_calls: 0,
                    total_prompt_tokens: 0,
                    total_duration_ms: total_start.elapsed().as_millis() as u64,
                },
            });
        }

        let instruction = self
            .config
            .instruction
            .as_deref()
            .unwrap_or(INSTRUCTION_PREFIX);

        let mut text = String::new();
        let mut records = Vec::with_capacity(plan.len());
        let mut generation_calls = 0usize;
        let mut total_prompt_tokens = 0usize;

        // ── Step 3: Extract → gate → generate → append, per chunk ────────
        for (index, chunk) in plan.iter().enumerate() {
            let chunk_start = Instant::now();

            // The prompt is rebuilt from the bare instruction prefix every
            // iteration; chunk text never carries over to the next prompt.
            let chunk_text = chunk_pages_text(document, &chunk);
            let prompt = prompts::chunk_prompt(instruction, &chunk_text);

            let mut prompt_tokens = 0;
            if multi_chunk {
                let (fits, measured) = self.budget.fits(&prompt).await;
                if !fits {
                    return Err(Pdf2QuizError::TokenLimitExceeded {
                        first_page: chunk.start,
                        last_page: chunk.end,
                        measured,
                        budget: self.budget.max_tokens(),
                    });
                }
                prompt_tokens = measured;
                total_prompt_tokens += measured;
            }

            let raw = self.generator.generate(&prompt).await?;
            generation_calls += 1;

            let cleaned = sanitize::clean_answer_set(&raw);
            if !cleaned.is_empty() {
                text.push_str(&cleaned);
                text.push('\n');
            }

            debug!(
                "Chunk {}/{} (pages {}–{}): {} chars generated",
                index + 1,
                plan.len(),
                chunk.start,
                chunk.end,
                raw.len()
            );
            records.push(ChunkRecord {
                index,
                pages: chunk,
                prompt_tokens,
                output_chars: raw.len(),
                duration_ms: chunk_start.elapsed().as_millis() as u64,
            });
        }

        // ── Step 4: Assemble stats ───────────────────────────────────────
        let stats = GenerationStats {
            page_count: document.page_count(),
            requested_pages: plan.page_total(),
            chunk_count: plan.len(),
            generation_calls,
            total_prompt_tokens,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };

        info!(
            "Generation complete: {} chunks, {} calls, {}ms total",
            stats.chunk_count, stats.generation_calls, stats.total_duration_ms
        );

        Ok(AnswerSetOutput {
            text,
            chunks: records,
            stats,
        })
    }

    /// Generate and persist in one step.
    ///
    /// The artifact is written only after the whole answer set succeeded —
    /// a failed request leaves no partial file behind.
    pub async fn generate_to_artifact(
        &self,
        document: &Document,
        title: &str,
        level: DetailLevel,
        range: Option<PageRange>,
    ) -> Result<GeneratedArtifact, Pdf2QuizError> {
        let output = self.build_answer_set(document, level, range).await?;
        let relative_path = self.writer.persist(title, &output.text).await?;
        Ok(GeneratedArtifact {
            relative_path,
            output,
        })
    }
}

/// Concatenate the extracted text of a chunk's pages, in page order.
fn chunk_pages_text(document: &Document, chunk: &Chunk) -> String {
    let mut text = String::new();
    for page in chunk.pages() {
        if let Some(page_text) = document.page_text(page) {
            let page_text = page_text.trim();
            if page_text.is_empty() {
                continue;
            }
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(page_text);
        }
    }
    text
}
