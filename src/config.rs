//! Configuration types for question-set generation.
//!
//! All generation behaviour is controlled through [`GenerationConfig`], built
//! via its [`GenerationConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across requests, serialise them for logging,
//! and diff two runs to understand why their outputs differ.
//!
//! The per-detail-level chunk sizes are deliberately NOT here: they are a
//! static property of [`DetailLevel`] itself, invariant across the system's
//! lifetime, so there is no knob to misconfigure.

use crate::error::Pdf2QuizError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Configuration for a question-set generation run.
///
/// Built via [`GenerationConfig::builder()`] or using
/// [`GenerationConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2quiz::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .model("gemini-1.5-flash")
///     .max_prompt_tokens(30_000)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Target model identifier, e.g. "gemini-1.5-flash". Default: "gemini-1.5-flash".
    ///
    /// Used for both generation and token counting so the measured count is
    /// always in the units the generation endpoint will bill against.
    pub model: String,

    /// API key for the generation provider. If None, read from the
    /// `GEMINI_API_KEY` environment variable when the provider is built.
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,

    /// Maximum tokens a single chunk prompt may measure. Default: 30 000.
    ///
    /// A hard gate, not a target: a chunk that measures over this aborts the
    /// whole request. 30 000 leaves ample headroom below the model context
    /// window for the instruction prefix and the response itself, while still
    /// admitting nine dense book pages (the largest chunk a detail level
    /// produces).
    pub max_prompt_tokens: usize,

    /// Minimum interval between any two generation calls. Default: 4 s.
    ///
    /// The free tier of the generation API is limited to 15 requests/minute;
    /// 4 seconds keeps a long-running book comfortably under that. The gate
    /// is process-wide: concurrent requests share one clock, so raising this
    /// slows everyone equally and lowering it risks 429s for everyone.
    pub min_call_interval: Duration,

    /// Per-API-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Sampling temperature for the generation call. Default: 0.2.
    ///
    /// Low temperature keeps the questions anchored to the page text rather
    /// than inviting the model to invent material that is not in the book.
    pub temperature: f32,

    /// Maximum tokens the model may generate per chunk. Default: 8192.
    pub max_output_tokens: usize,

    /// Directory artifacts are written into (created if absent).
    /// Default: "artifacts".
    pub artifact_dir: PathBuf,

    /// Custom instruction prefix. If None, uses the built-in default.
    pub instruction: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
            max_prompt_tokens: 30_000,
            min_call_interval: Duration::from_secs(4),
            api_timeout_secs: 60,
            temperature: 0.2,
            max_output_tokens: 8192,
            artifact_dir: PathBuf::from("artifacts"),
            instruction: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("max_prompt_tokens", &self.max_prompt_tokens)
            .field("min_call_interval", &self.min_call_interval)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("artifact_dir", &self.artifact_dir)
            .field("instruction", &self.instruction)
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn max_prompt_tokens(mut self, n: usize) -> Self {
        self.config.max_prompt_tokens = n;
        self
    }

    pub fn min_call_interval(mut self, interval: Duration) -> Self {
        self.config.min_call_interval = interval;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.config.max_output_tokens = n;
        self
    }

    pub fn artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.artifact_dir = dir.into();
        self
    }

    pub fn instruction(mut self, prefix: impl Into<String>) -> Self {
        self.config.instruction = Some(prefix.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, Pdf2QuizError> {
        let c = &self.config;
        if c.model.is_empty() {
            return Err(Pdf2QuizError::InvalidConfig("model must not be empty".into()));
        }
        if c.max_prompt_tokens == 0 {
            return Err(Pdf2QuizError::InvalidConfig(
                "max_prompt_tokens must be ≥ 1".into(),
            ));
        }
        if c.max_output_tokens == 0 {
            return Err(Pdf2QuizError::InvalidConfig(
                "max_output_tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Granularity of the generated question set.
///
/// Each level maps to a fixed number of pages per generation call. Fewer
/// pages per call means the model sees less text at once and asks about it
/// in more depth — at the price of more calls (and more rate-limit waits)
/// for the same document:
///
/// | Level | Pages per chunk | Use case |
/// |-------|-----------------|----------|
/// | Basic | 9 | Skim coverage, chapter-level recall |
/// | Intermediate | 5 | Section-level study (default) |
/// | Detailed | 3 | Exam preparation, dense material |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// Broad questions over large page groups.
    Basic,
    /// Mid-granularity questions. (default)
    #[default]
    Intermediate,
    /// Fine-grained questions over small page groups.
    Detailed,
}

impl DetailLevel {
    /// Pages grouped into one generation call at this level.
    ///
    /// A static lookup, invariant for the lifetime of the system.
    pub fn chunk_size(self) -> usize {
        match self {
            DetailLevel::Basic => 9,
            DetailLevel::Intermediate => 5,
            DetailLevel::Detailed => 3,
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DetailLevel::Basic => "basic",
            DetailLevel::Intermediate => "intermediate",
            DetailLevel::Detailed => "detailed",
        };
        f.write_str(s)
    }
}

impl FromStr for DetailLevel {
    type Err = Pdf2QuizError;

    /// Accepts `basic`, `intermediate`, `detailed` (case-insensitive).
    /// `in-depth` is accepted as a legacy alias for `detailed`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(DetailLevel::Basic),
            "intermediate" => Ok(DetailLevel::Intermediate),
            "detailed" | "in-depth" => Ok(DetailLevel::Detailed),
            other => Err(Pdf2QuizError::InvalidConfig(format!(
                "unknown detail level '{other}' (expected basic, intermediate, or detailed)"
            ))),
        }
    }
}

/// A contiguous span of pages to generate questions over.
///
/// Both bounds are 1-based and inclusive. When no range is supplied the
/// whole document is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    /// First page of the span (1-based).
    pub start: usize,
    /// Last page of the span (1-based, inclusive of that page's content).
    pub end: usize,
}

impl PageRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Validate the range against a document's page count.
    ///
    /// Runs before any chunking or generation work, so a bad range never
    /// costs an API call.
    pub fn validate(&self, page_count: usize) -> Result<(), Pdf2QuizError> {
        if self.start < 1 || self.start > self.end {
            return Err(Pdf2QuizError::InvalidPageRange {
                start: self.start,
                end: self.end,
            });
        }
        if self.end > page_count {
            return Err(Pdf2QuizError::PageOutOfRange {
                page: self.end,
                total: page_count,
            });
        }
        Ok(())
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", self.start, self.end)
    }
}
