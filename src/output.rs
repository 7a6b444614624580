//! Output types: the assembled answer set plus per-chunk and whole-run stats.

use crate::pipeline::plan::Chunk;
use serde::{Deserialize, Serialize};

/// The result of one question-set generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSetOutput {
    /// Sanitised `question;answer` lines, chunk outputs concatenated in
    /// chunk order. Equal to [`crate::prompts::NO_TEXT_FALLBACK`] when the
    /// requested span had no extractable text.
    pub text: String,

    /// One record per processed chunk, in order. Empty on the sentinel path
    /// (no chunk was processed).
    pub chunks: Vec<ChunkRecord>,

    /// Whole-run counters.
    pub stats: GenerationStats,
}

/// What happened to a single chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Zero-based position in the plan.
    pub index: usize,

    /// The pages this chunk covered.
    pub pages: Chunk,

    /// Measured prompt tokens. 0 for single-chunk runs (not budget-gated)
    /// and for the sentinel path (no prompt was built).
    pub prompt_tokens: usize,

    /// Length of the model's raw output in characters.
    pub output_chars: usize,

    /// Wall-clock time spent on this chunk, including the rate-gate wait.
    pub duration_ms: u64,
}

/// Counters for one generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Total pages in the source document.
    pub page_count: usize,

    /// Pages actually requested (full document when no range was given).
    pub requested_pages: usize,

    /// Chunks the planner produced.
    pub chunk_count: usize,

    /// Generation API calls issued. 0 on the sentinel path.
    pub generation_calls: usize,

    /// Sum of measured prompt tokens across budget-gated chunks.
    pub total_prompt_tokens: usize,

    /// End-to-end wall-clock time.
    pub total_duration_ms: u64,
}
