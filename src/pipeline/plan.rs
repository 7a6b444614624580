//! Chunk planning: group the requested pages into bounded, ordered chunks.
//!
//! The planner is pure arithmetic over page numbers — boundaries are page
//! counts, never content. That keeps it deterministic: planning the same
//! request twice yields the same chunks, which the orchestrator relies on
//! when it reports per-chunk records.

use crate::config::{DetailLevel, PageRange};
use crate::error::Pdf2QuizError;
use serde::{Deserialize, Serialize};

/// A contiguous group of pages submitted as one generation call.
///
/// Bounds are 1-based and inclusive, `len() ≤ chunk_size`. Chunks from one
/// plan never overlap and their ordered union is exactly the requested span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// First page (1-based).
    pub start: usize,
    /// Last page (1-based, inclusive).
    pub end: usize,
}

impl Chunk {
    /// Number of pages in the chunk.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false // a chunk always covers at least one page
    }

    /// Iterate the chunk's page numbers in order.
    pub fn pages(&self) -> impl Iterator<Item = usize> {
        self.start..=self.end
    }
}

/// An ordered plan of chunks over a validated page span.
///
/// Lazy and restartable: [`ChunkPlan::iter`] computes chunks on the fly and
/// can be called any number of times with identical results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    span_start: usize,
    span_end: usize,
    chunk_size: usize,
}

impl ChunkPlan {
    /// Resolve the effective span and validate it against the document.
    ///
    /// `range` if provided (validated `1 ≤ start ≤ end ≤ page_count`),
    /// else the full document `[1, page_count]`. Errors here mean no
    /// chunking or generation work has been done yet.
    pub fn new(
        page_count: usize,
        level: DetailLevel,
        range: Option<PageRange>,
    ) -> Result<Self, Pdf2QuizError> {
        if page_count == 0 {
            return Err(Pdf2QuizError::PageOutOfRange { page: 1, total: 0 });
        }
        let (span_start, span_end) = match range {
            Some(r) => {
                r.validate(page_count)?;
                (r.start, r.end)
            }
            None => (1, page_count),
        };
        Ok(Self {
            span_start,
            span_end,
            chunk_size: level.chunk_size(),
        })
    }

    /// Number of chunks the plan will produce.
    pub fn len(&self) -> usize {
        self.page_total().div_ceil(self.chunk_size)
    }

    pub fn is_empty(&self) -> bool {
        false // a validated span always yields at least one chunk
    }

    /// Pages covered by the plan.
    pub fn page_total(&self) -> usize {
        self.span_end - self.span_start + 1
    }

    /// The requested span as a range.
    pub fn span(&self) -> PageRange {
        PageRange::new(self.span_start, self.span_end)
    }

    /// Iterate the chunks in page order.
    ///
    /// Successive chunks of `chunk_size` pages; the last chunk may be
    /// shorter — the span's final page is always a boundary, so a partial
    /// tail is always flushed. A span that fits in one chunk (including the
    /// one-page degenerate case) is emitted unsplit.
    pub fn iter(&self) -> impl Iterator<Item = Chunk> + '_ {
        let size = self.chunk_size;
        let end = self.span_end;
        (self.span_start..=end).step_by(size).map(move |start| Chunk {
            start,
            end: (start + size - 1).min(end),
        })
    }
}
