//! Page extraction: open a PDF and pull each page's text layer via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto a dedicated
//! thread-pool thread so the Tokio workers never stall on CPU-bound text
//! extraction.
//!
//! ## Why extract everything up front?
//!
//! Pulling the full text layer in one pass means the document is opened by
//! pdfium exactly once per request, and the orchestrator afterwards works
//! with plain in-memory strings — no blocking calls interleaved with the
//! rate-limited generation loop. Text layers are small compared to the PDFs
//! they come from; a 500-page book is a few megabytes of strings.
//!
//! We validate the `%PDF` magic bytes before handing the file to pdfium so
//! callers get a meaningful error rather than a pdfium parse failure.

use crate::error::Pdf2QuizError;
use pdfium_render::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A paginated document with its text layer extracted.
///
/// Immutable once opened; owned by the caller for the duration of one
/// generation request. Page numbers are 1-based throughout.
#[derive(Debug, Clone)]
pub struct Document {
    pages: Vec<String>,
}

impl Document {
    /// Open a PDF file and extract every page's text.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Pdf2QuizError> {
        let path = path.as_ref().to_path_buf();
        validate_pdf_magic(&path)?;

        let pages = tokio::task::spawn_blocking(move || extract_all_pages(&path))
            .await
            .map_err(|e| Pdf2QuizError::Internal(format!("extraction task panicked: {e}")))??;

        info!("PDF opened: {} pages", pages.len());
        Ok(Self { pages })
    }

    /// Open a PDF from raw bytes.
    ///
    /// pdfium needs a file-system path, so the bytes go into a managed
    /// [`tempfile`] that is cleaned up when extraction returns or panics.
    /// This is the right entry point when the PDF comes from a database,
    /// upload buffer, or network stream rather than a file on disk.
    pub async fn from_bytes(bytes: &[u8]) -> Result<Self, Pdf2QuizError> {
        let mut tmp = tempfile::NamedTempFile::new()
            .map_err(|e| Pdf2QuizError::Internal(format!("tempfile: {e}")))?;
        tmp.write_all(bytes)
            .map_err(|e| Pdf2QuizError::Internal(format!("tempfile write: {e}")))?;
        // `tmp` is dropped (and the file deleted) when `open` returns
        Self::open(tmp.path()).await
    }

    /// Build a document directly from page texts.
    ///
    /// Used by tests and by callers whose pages come from somewhere other
    /// than a PDF.
    pub fn from_pages(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// Total number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The extracted text of a page (1-based). `None` when out of range.
    pub fn page_text(&self, page: usize) -> Option<&str> {
        if page == 0 {
            return None;
        }
        self.pages.get(page - 1).map(String::as_str)
    }
}

/// Check the `%PDF` magic bytes without involving pdfium.
fn validate_pdf_magic(path: &Path) -> Result<(), Pdf2QuizError> {
    use std::io::Read;

    let mut f = std::fs::File::open(path).map_err(|_| Pdf2QuizError::FileNotFound {
        path: path.to_path_buf(),
    })?;

    let mut magic = [0u8; 4];
    if f.read_exact(&mut magic).is_err() || &magic != b"%PDF" {
        return Err(Pdf2QuizError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

/// Blocking implementation of full-document text extraction.
fn extract_all_pages(pdf_path: &PathBuf) -> Result<Vec<String>, Pdf2QuizError> {
    let pdfium = Pdfium::default();

    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| Pdf2QuizError::CorruptPdf {
                path: pdf_path.clone(),
                detail: format!("{e:?}"),
            })?;

    let pages = document.pages();
    let total = pages.len() as usize;
    let mut texts = Vec::with_capacity(total);

    for idx in 0..total {
        let page = pages
            .get(idx as u16)
            .map_err(|e| Pdf2QuizError::ExtractionFailed {
                page: idx + 1,
                detail: format!("{e:?}"),
            })?;

        let text = page
            .text()
            .map(|t| t.all())
            .map_err(|e| Pdf2QuizError::ExtractionFailed {
                page: idx + 1,
                detail: format!("{e:?}"),
            })?;

        debug!("Extracted page {} → {} chars", idx + 1, text.len());
        texts.push(text);
    }

    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pages_is_one_based() {
        let doc = Document::from_pages(vec!["alpha".into(), "beta".into()]);
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_text(1), Some("alpha"));
        assert_eq!(doc.page_text(2), Some("beta"));
        assert_eq!(doc.page_text(0), None);
        assert_eq!(doc.page_text(3), None);
    }

    #[tokio::test]
    async fn open_rejects_missing_file() {
        let err = Document::open("/definitely/not/a/real/book.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2QuizError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn from_bytes_rejects_non_pdf() {
        let err = Document::from_bytes(b"this is plain text, not a pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2QuizError::NotAPdf { .. }));
    }
}
