//! Error types for the pdf2quiz library.
//!
//! One fatal error enum covers the whole request lifecycle. The taxonomy
//! mirrors the request phases:
//!
//! * **Input validation** (`InvalidPageRange`, `PageOutOfRange`) — rejected
//!   before any chunking or generation work begins.
//! * **Budget** (`TokenLimitExceeded`) — raised mid-orchestration; the whole
//!   request aborts and no artifact is written.
//! * **Generation service** (`GenerationFailed`) — transient API failures
//!   propagate; the request fails as a whole, no automatic retry.
//! * **Token counting** (`TokenCountFailed`) — the one variant that callers
//!   normally never see: [`crate::pipeline::budget::TokenBudget`] downgrades
//!   it to "over budget" instead of propagating.
//!
//! A document with no extractable text is deliberately NOT an error — the
//! orchestrator returns a fixed fallback message as the generated content so
//! scanned-image PDFs don't hard-fail the request.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2quiz library.
#[derive(Debug, Error)]
pub enum Pdf2QuizError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The text layer of a specific page could not be read.
    #[error("Text extraction failed for page {page}: {detail}")]
    ExtractionFailed { page: usize, detail: String },

    // ── Validation errors ─────────────────────────────────────────────────
    /// The requested page range is inverted or starts before page 1.
    #[error("Invalid page range {start}–{end}: start must be ≥ 1 and ≤ end")]
    InvalidPageRange { start: usize, end: usize },

    /// Requested page numbers exceed the actual page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    // ── Generation errors ─────────────────────────────────────────────────
    /// A chunk's prompt does not fit the configured token budget.
    ///
    /// The whole request aborts: splitting the chunk further would mix
    /// detail levels inside one output, which is not a coherent result.
    #[error(
        "Prompt for pages {first_page}–{last_page} exceeds the token budget \
         ({measured} tokens, limit {budget})\nRequest a narrower page range or a finer detail level."
    )]
    TokenLimitExceeded {
        first_page: usize,
        last_page: usize,
        measured: usize,
        budget: usize,
    },

    /// The generation API returned an error (quota, network, non-2xx).
    #[error("Generation service error: {detail}")]
    GenerationFailed { detail: String },

    /// The token-counting API returned an error.
    ///
    /// Normally absorbed by the budget gate (treated as over budget);
    /// surfaces only when a counter is called outside that boundary.
    #[error("Token counting failed: {detail}")]
    TokenCountFailed { detail: String },

    /// The provider is missing its API key.
    #[error("Generation provider is not configured: {hint}")]
    ProviderNotConfigured { hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the artifact file.
    #[error("Failed to write artifact '{path}': {source}")]
    ArtifactWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_range_display() {
        let e = Pdf2QuizError::InvalidPageRange { start: 7, end: 3 };
        let msg = e.to_string();
        assert!(msg.contains("7–3"), "got: {msg}");
    }

    #[test]
    fn page_out_of_range_display() {
        let e = Pdf2QuizError::PageOutOfRange { page: 40, total: 12 };
        let msg = e.to_string();
        assert!(msg.contains("40"));
        assert!(msg.contains("12 pages"));
    }

    #[test]
    fn token_limit_display() {
        let e = Pdf2QuizError::TokenLimitExceeded {
            first_page: 10,
            last_page: 18,
            measured: 45_000,
            budget: 30_000,
        };
        let msg = e.to_string();
        assert!(msg.contains("10–18"), "got: {msg}");
        assert!(msg.contains("45000"));
        assert!(msg.contains("30000"));
    }

    #[test]
    fn generation_failed_display() {
        let e = Pdf2QuizError::GenerationFailed {
            detail: "HTTP 429: quota exhausted".into(),
        };
        assert!(e.to_string().contains("429"));
    }

    #[test]
    fn artifact_write_failed_has_source() {
        use std::error::Error;
        let e = Pdf2QuizError::ArtifactWriteFailed {
            path: PathBuf::from("/tmp/out.txt"),
            source: std::io::Error::new(std::io::ErrorKind::AlreadyExists, "exists"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/tmp/out.txt"));
    }
}
