//! Artifact persistence: write the assembled answer set to a unique file.
//!
//! Filenames combine a slug of the source title with a random v4 UUID, so
//! regenerating a question set for the same book never clobbers an earlier
//! run. The UUID makes collisions practically impossible, not guaranteed —
//! the file is opened with `create_new`, so an actual collision surfaces as
//! a write error rather than a silent overwrite.

use crate::error::Pdf2QuizError;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Writes answer-set artifacts under a configured root directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The configured artifact root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist `text` under a unique filename derived from `title`.
    ///
    /// Creates the root directory if absent. Returns the path of the new
    /// file **relative to the root** — the stable reference callers store.
    pub async fn persist(&self, title: &str, text: &str) -> Result<PathBuf, Pdf2QuizError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| Pdf2QuizError::ArtifactWriteFailed {
                path: self.root.clone(),
                source: e,
            })?;

        let filename = format!("{}-{}.txt", slugify(title), Uuid::new_v4());
        let path = self.root.join(&filename);

        // create_new: a filename collision is an error, never an overwrite.
        let write = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;

        let mut file = write.map_err(|e| Pdf2QuizError::ArtifactWriteFailed {
            path: path.clone(),
            source: e,
        })?;

        use tokio::io::AsyncWriteExt;
        file.write_all(text.as_bytes())
            .await
            .map_err(|e| Pdf2QuizError::ArtifactWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        file.flush()
            .await
            .map_err(|e| Pdf2QuizError::ArtifactWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        info!("Artifact written: {}", path.display());
        Ok(PathBuf::from(filename))
    }
}

/// Reduce a title to a filesystem-safe slug.
///
/// Alphanumerics are kept (lowercased), runs of anything else collapse to a
/// single dash. An empty or fully non-alphanumeric title becomes "book".
fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true; // suppress a leading dash
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "book".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_keeps_alphanumerics() {
        assert_eq!(slugify("Linear Algebra Done Right"), "linear-algebra-done-right");
    }

    #[test]
    fn slugify_collapses_punctuation_runs() {
        assert_eq!(slugify("C++ / Rust: a tale!!"), "c-rust-a-tale");
    }

    #[test]
    fn slugify_empty_title_falls_back() {
        assert_eq!(slugify(""), "book");
        assert_eq!(slugify("???"), "book");
    }

    #[tokio::test]
    async fn persist_writes_under_root_and_returns_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());

        let rel = writer.persist("My Book", "q;a\n").await.unwrap();
        assert!(rel.is_relative());
        assert!(rel.to_string_lossy().starts_with("my-book-"));
        assert!(rel.to_string_lossy().ends_with(".txt"));

        let full = dir.path().join(&rel);
        let written = std::fs::read_to_string(full).unwrap();
        assert_eq!(written, "q;a\n");
    }

    #[tokio::test]
    async fn persist_creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/artifacts");
        let writer = ArtifactWriter::new(&nested);

        writer.persist("t", "text").await.unwrap();
        assert!(nested.exists());
    }

    #[tokio::test]
    async fn two_persists_of_the_same_title_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());

        let a = writer.persist("Same Title", "first").await.unwrap();
        let b = writer.persist("Same Title", "second").await.unwrap();
        assert_ne!(a, b);
    }
}
