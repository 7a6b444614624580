//! Integration tests for question-set orchestration.
//!
//! Everything here runs against scripted in-memory backends — no PDF files,
//! no network. `Document::from_pages` supplies page text directly and the
//! `QuizBuilder::with_backends` seam swaps the generation provider for
//! recording mocks, so the full plan → budget → generate → assemble loop is
//! exercised exactly as production runs it.

use async_trait::async_trait;
use pdf2quiz::prompts::{INSTRUCTION_PREFIX, NO_TEXT_FALLBACK};
use pdf2quiz::{
    DetailLevel, Document, GenerationConfig, PageRange, Pdf2QuizError, QuizBuilder, TextGenerator,
    TokenCounter,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Test backends ────────────────────────────────────────────────────────────

/// Records every prompt and answers with a numbered pair.
#[derive(Default)]
struct RecordingGenerator {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, Pdf2QuizError> {
        let mut prompts = self.prompts.lock().unwrap();
        prompts.push(prompt.to_string());
        let n = prompts.len();
        Ok(format!("chunk {n} question;chunk {n} answer"))
    }
}

impl RecordingGenerator {
    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

/// Records the (test-clock) time of every call.
#[derive(Default)]
struct TimestampingGenerator {
    calls: Mutex<Vec<tokio::time::Instant>>,
}

#[async_trait]
impl TextGenerator for TimestampingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, Pdf2QuizError> {
        self.calls.lock().unwrap().push(tokio::time::Instant::now());
        Ok("q;a".to_string())
    }
}

/// Always fails, as a quota-exhausted service would.
struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, Pdf2QuizError> {
        Err(Pdf2QuizError::GenerationFailed {
            detail: "HTTP 429: quota exhausted".into(),
        })
    }
}

/// Reports a fixed token count for every prompt.
struct FixedCounter(usize);

#[async_trait]
impl TokenCounter for FixedCounter {
    async fn count_tokens(&self, _model: &str, _text: &str) -> Result<usize, Pdf2QuizError> {
        Ok(self.0)
    }
}

/// Pops a scripted count per call.
struct ScriptedCounter {
    counts: Mutex<VecDeque<usize>>,
}

impl ScriptedCounter {
    fn new(counts: impl IntoIterator<Item = usize>) -> Self {
        Self {
            counts: Mutex::new(counts.into_iter().collect()),
        }
    }
}

#[async_trait]
impl TokenCounter for ScriptedCounter {
    async fn count_tokens(&self, _model: &str, _text: &str) -> Result<usize, Pdf2QuizError> {
        Ok(self
            .counts
            .lock()
            .unwrap()
            .pop_front()
            .expect("counter called more times than scripted"))
    }
}

/// Fails every count, as a down counting endpoint would.
struct FailingCounter;

#[async_trait]
impl TokenCounter for FailingCounter {
    async fn count_tokens(&self, _model: &str, _text: &str) -> Result<usize, Pdf2QuizError> {
        Err(Pdf2QuizError::TokenCountFailed {
            detail: "connection refused".into(),
        })
    }
}

/// Panics when consulted — asserts a code path never counts tokens.
struct UnreachableCounter;

#[async_trait]
impl TokenCounter for UnreachableCounter {
    async fn count_tokens(&self, _model: &str, _text: &str) -> Result<usize, Pdf2QuizError> {
        panic!("token counter must not be consulted on this path");
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn pages(n: usize) -> Document {
    Document::from_pages((1..=n).map(|i| format!("page {i} text")).collect())
}

/// Config with a zero-length gate interval so non-timing tests run instantly.
fn instant_config() -> GenerationConfig {
    GenerationConfig::builder()
        .min_call_interval(Duration::ZERO)
        .build()
        .unwrap()
}

fn builder_with(
    config: GenerationConfig,
    generator: Arc<dyn TextGenerator>,
    counter: Arc<dyn TokenCounter>,
) -> QuizBuilder {
    QuizBuilder::with_backends(config, generator, counter)
}

// ── Chunking and call-count properties ───────────────────────────────────────

#[tokio::test]
async fn twenty_page_basic_run_makes_three_calls_in_order() {
    let generator = Arc::new(RecordingGenerator::default());
    let quiz = builder_with(instant_config(), generator.clone(), Arc::new(FixedCounter(1)));

    let output = quiz
        .build_answer_set(&pages(20), DetailLevel::Basic, None)
        .await
        .unwrap();

    assert_eq!(output.stats.chunk_count, 3);
    assert_eq!(output.stats.generation_calls, 3);
    assert_eq!(output.stats.requested_pages, 20);

    let bounds: Vec<(usize, usize)> = output
        .chunks
        .iter()
        .map(|c| (c.pages.start, c.pages.end))
        .collect();
    assert_eq!(bounds, vec![(1, 9), (10, 18), (19, 20)]);

    // Final text is the chunk outputs concatenated in chunk order.
    assert_eq!(
        output.text,
        "chunk 1 question;chunk 1 answer\n\
         chunk 2 question;chunk 2 answer\n\
         chunk 3 question;chunk 3 answer\n"
    );
}

#[tokio::test]
async fn three_page_detailed_full_range_is_one_call() {
    let generator = Arc::new(RecordingGenerator::default());
    let quiz = builder_with(
        instant_config(),
        generator.clone(),
        Arc::new(UnreachableCounter),
    );

    let output = quiz
        .build_answer_set(&pages(3), DetailLevel::Detailed, Some(PageRange::new(1, 3)))
        .await
        .unwrap();

    assert_eq!(output.stats.chunk_count, 1);
    assert_eq!(output.stats.generation_calls, 1);
    assert_eq!(generator.prompts().len(), 1);
}

#[tokio::test]
async fn single_page_range_is_one_one_page_chunk() {
    let generator = Arc::new(RecordingGenerator::default());
    let quiz = builder_with(
        instant_config(),
        generator.clone(),
        Arc::new(UnreachableCounter),
    );

    let output = quiz
        .build_answer_set(&pages(30), DetailLevel::Basic, Some(PageRange::new(2, 2)))
        .await
        .unwrap();

    assert_eq!(output.stats.generation_calls, 1);
    assert_eq!(output.chunks[0].pages.start, 2);
    assert_eq!(output.chunks[0].pages.end, 2);

    let prompts = generator.prompts();
    assert!(prompts[0].contains("page 2 text"));
    assert!(!prompts[0].contains("page 1 text"));
    assert!(!prompts[0].contains("page 3 text"));
}

// ── Validation properties ────────────────────────────────────────────────────

#[tokio::test]
async fn inverted_range_fails_before_any_work() {
    let generator = Arc::new(RecordingGenerator::default());
    let quiz = builder_with(
        instant_config(),
        generator.clone(),
        Arc::new(UnreachableCounter),
    );

    let err = quiz
        .build_answer_set(&pages(20), DetailLevel::Basic, Some(PageRange::new(9, 4)))
        .await
        .unwrap_err();

    assert!(matches!(err, Pdf2QuizError::InvalidPageRange { start: 9, end: 4 }));
    assert!(generator.prompts().is_empty(), "no generation work may start");
}

#[tokio::test]
async fn range_past_document_end_fails_before_any_work() {
    let generator = Arc::new(RecordingGenerator::default());
    let quiz = builder_with(
        instant_config(),
        generator.clone(),
        Arc::new(UnreachableCounter),
    );

    let err = quiz
        .build_answer_set(&pages(10), DetailLevel::Basic, Some(PageRange::new(5, 15)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Pdf2QuizError::PageOutOfRange { page: 15, total: 10 }
    ));
    assert!(generator.prompts().is_empty());
}

// ── Sentinel properties ──────────────────────────────────────────────────────

#[tokio::test]
async fn all_empty_pages_yield_sentinel_with_zero_calls() {
    let generator = Arc::new(RecordingGenerator::default());
    let quiz = builder_with(
        instant_config(),
        generator.clone(),
        Arc::new(UnreachableCounter),
    );

    // 12 whitespace-only pages at Detailed = a 4-chunk plan; the sentinel
    // must still short-circuit before any call.
    let blank = Document::from_pages(vec!["  \n".to_string(); 12]);
    let output = quiz
        .build_answer_set(&blank, DetailLevel::Detailed, None)
        .await
        .unwrap();

    assert_eq!(output.text, NO_TEXT_FALLBACK);
    assert_eq!(output.stats.generation_calls, 0);
    assert_eq!(output.stats.chunk_count, 4);
    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn empty_range_of_mixed_document_yields_sentinel() {
    let generator = Arc::new(RecordingGenerator::default());
    let quiz = builder_with(
        instant_config(),
        generator.clone(),
        Arc::new(UnreachableCounter),
    );

    // Pages 4–5 are blank; the rest of the document has text.
    let mut texts: Vec<String> = (1..=6).map(|i| format!("page {i} text")).collect();
    texts[3] = String::new();
    texts[4] = String::new();
    let doc = Document::from_pages(texts);

    let output = quiz
        .build_answer_set(&doc, DetailLevel::Basic, Some(PageRange::new(4, 5)))
        .await
        .unwrap();

    assert_eq!(output.text, NO_TEXT_FALLBACK);
    assert!(generator.prompts().is_empty());
}

// ── Budget properties ────────────────────────────────────────────────────────

#[tokio::test]
async fn over_budget_first_chunk_aborts_before_any_call() {
    let config = GenerationConfig::builder()
        .min_call_interval(Duration::ZERO)
        .max_prompt_tokens(100)
        .build()
        .unwrap();
    let generator = Arc::new(RecordingGenerator::default());
    let quiz = builder_with(config, generator.clone(), Arc::new(FixedCounter(101)));

    let err = quiz
        .build_answer_set(&pages(20), DetailLevel::Basic, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Pdf2QuizError::TokenLimitExceeded {
            first_page: 1,
            last_page: 9,
            measured: 101,
            budget: 100,
        }
    ));
    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn over_budget_later_chunk_aborts_mid_flight() {
    let config = GenerationConfig::builder()
        .min_call_interval(Duration::ZERO)
        .max_prompt_tokens(100)
        .build()
        .unwrap();
    let generator = Arc::new(RecordingGenerator::default());
    let quiz = builder_with(
        config,
        generator.clone(),
        Arc::new(ScriptedCounter::new([50, 400])),
    );

    let err = quiz
        .build_answer_set(&pages(20), DetailLevel::Basic, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Pdf2QuizError::TokenLimitExceeded {
            first_page: 10,
            last_page: 18,
            measured: 400,
            ..
        }
    ));
    // Chunk 1 passed its gate and was generated before chunk 2 aborted.
    assert_eq!(generator.prompts().len(), 1);
}

#[tokio::test]
async fn counter_failure_fails_closed_as_token_limit() {
    let generator = Arc::new(RecordingGenerator::default());
    let quiz = builder_with(instant_config(), generator.clone(), Arc::new(FailingCounter));

    let err = quiz
        .build_answer_set(&pages(20), DetailLevel::Basic, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Pdf2QuizError::TokenLimitExceeded { measured: 0, .. }
    ));
    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn generation_failure_propagates_and_aborts() {
    let quiz = builder_with(
        instant_config(),
        Arc::new(FailingGenerator),
        Arc::new(FixedCounter(1)),
    );

    let err = quiz
        .build_answer_set(&pages(20), DetailLevel::Basic, None)
        .await
        .unwrap_err();

    assert!(matches!(err, Pdf2QuizError::GenerationFailed { .. }));
}

// ── Prompt construction invariants ───────────────────────────────────────────

#[tokio::test]
async fn prompts_never_carry_text_between_chunks() {
    let generator = Arc::new(RecordingGenerator::default());
    let quiz = builder_with(instant_config(), generator.clone(), Arc::new(FixedCounter(1)));

    quiz.build_answer_set(&pages(10), DetailLevel::Intermediate, None)
        .await
        .unwrap();

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 2);

    // Every prompt is rebuilt from the bare instruction prefix.
    for p in &prompts {
        assert!(p.starts_with(INSTRUCTION_PREFIX));
        assert_eq!(p.matches(INSTRUCTION_PREFIX).count(), 1);
    }

    // Chunk 1 carries pages 1–5, chunk 2 carries pages 6–10 and nothing else.
    assert!(prompts[0].contains("page 1 text"));
    assert!(prompts[0].contains("page 5 text"));
    assert!(!prompts[0].contains("page 6 text"));

    assert!(prompts[1].contains("page 6 text"));
    assert!(prompts[1].contains("page 10 text"));
    assert!(
        !prompts[1].contains("page 1 text"),
        "chunk 2's prompt must not contain chunk 1's text"
    );
}

// ── Rate-gate properties (paused test clock) ─────────────────────────────────

#[tokio::test(start_paused = true)]
async fn generation_calls_are_spaced_by_the_minimum_interval() {
    let interval = Duration::from_secs(4);
    let config = GenerationConfig::builder()
        .min_call_interval(interval)
        .build()
        .unwrap();
    let generator = Arc::new(TimestampingGenerator::default());
    let quiz = builder_with(config, generator.clone(), Arc::new(FixedCounter(1)));

    quiz.build_answer_set(&pages(20), DetailLevel::Basic, None)
        .await
        .unwrap();

    let calls = generator.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 3);
    for pair in calls.windows(2) {
        assert!(
            pair[1].duration_since(pair[0]) >= interval,
            "calls only {:?} apart",
            pair[1].duration_since(pair[0])
        );
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_requests_share_one_rate_gate() {
    let interval = Duration::from_secs(4);
    let config = GenerationConfig::builder()
        .min_call_interval(interval)
        .build()
        .unwrap();
    let generator = Arc::new(TimestampingGenerator::default());
    let quiz = Arc::new(builder_with(
        config,
        generator.clone(),
        Arc::new(FixedCounter(1)),
    ));

    // Two independent documents racing through the same builder.
    let doc_a = pages(10);
    let doc_b = pages(10);
    let (a, b) = tokio::join!(
        quiz.build_answer_set(&doc_a, DetailLevel::Intermediate, None),
        quiz.build_answer_set(&doc_b, DetailLevel::Intermediate, None),
    );
    a.unwrap();
    b.unwrap();

    let mut calls = generator.calls.lock().unwrap().clone();
    calls.sort();
    assert_eq!(calls.len(), 4);
    for pair in calls.windows(2) {
        assert!(
            pair[1].duration_since(pair[0]) >= interval,
            "two calls landed inside one interval window"
        );
    }
}

// ── Artifact persistence ─────────────────────────────────────────────────────

#[tokio::test]
async fn success_persists_an_artifact_with_the_output_text() {
    let dir = tempfile::tempdir().unwrap();
    let config = GenerationConfig::builder()
        .min_call_interval(Duration::ZERO)
        .artifact_dir(dir.path())
        .build()
        .unwrap();
    let quiz = builder_with(
        config,
        Arc::new(RecordingGenerator::default()),
        Arc::new(FixedCounter(1)),
    );

    let artifact = quiz
        .generate_to_artifact(&pages(20), "Linear Algebra", DetailLevel::Basic, None)
        .await
        .unwrap();

    assert!(artifact.relative_path.is_relative());
    let written = std::fs::read_to_string(dir.path().join(&artifact.relative_path)).unwrap();
    assert_eq!(written, artifact.output.text);
}

#[tokio::test]
async fn failed_request_leaves_no_artifact_behind() {
    let dir = tempfile::tempdir().unwrap();
    let config = GenerationConfig::builder()
        .min_call_interval(Duration::ZERO)
        .max_prompt_tokens(10)
        .artifact_dir(dir.path())
        .build()
        .unwrap();
    let quiz = builder_with(
        config,
        Arc::new(RecordingGenerator::default()),
        Arc::new(FixedCounter(999)),
    );

    let err = quiz
        .generate_to_artifact(&pages(20), "Doomed Book", DetailLevel::Basic, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Pdf2QuizError::TokenLimitExceeded { .. }));

    let leftover = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftover, 0, "no partial artifact may be written");
}

// ── Config surface ───────────────────────────────────────────────────────────

#[test]
fn builder_rejects_zero_budget() {
    let err = GenerationConfig::builder().max_prompt_tokens(0).build();
    assert!(err.is_err());
}

#[test]
fn debug_output_redacts_the_api_key() {
    let config = GenerationConfig::builder()
        .api_key("sk-very-secret")
        .build()
        .unwrap();
    let debug = format!("{config:?}");
    assert!(!debug.contains("sk-very-secret"));
    assert!(debug.contains("<redacted>"));
}
