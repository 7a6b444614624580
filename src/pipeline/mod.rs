//! Pipeline stages for question-set generation.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different generation provider) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ plan ──▶ budget ──▶ llm ──▶ sanitize
//! (pdfium)   (chunks)  (gate)   (rate-  (pair
//!                               limited  cleanup)
//!                               calls)
//! ```
//!
//! 1. [`extract`]  — open the PDF and pull each page's text layer; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 2. [`plan`]     — group the requested pages into ordered, bounded chunks
//! 3. [`budget`]   — gate each chunk's prompt against the token budget,
//!    failing closed when the counter itself fails
//! 4. [`llm`]      — drive the generation call through the process-wide rate
//!    gate; the only stage with network I/O
//! 5. [`sanitize`] — deterministic cleanup of model output into
//!    `question;answer` lines
pub mod budget;
pub mod extract;
pub mod llm;
pub mod plan;
pub mod sanitize;
