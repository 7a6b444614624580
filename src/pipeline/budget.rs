//! Token budget gating: measure a prompt and decide whether it may be sent.
//!
//! Counting happens against the same model identifier the generation call
//! will use, so the measurement is in the units the service actually
//! enforces. The threshold is a configuration constant — callers cannot
//! loosen it per request.
//!
//! ## Failing closed
//!
//! The counter is a network service and can fail (auth, quota, transport).
//! A failed count reports the prompt as over budget rather than letting an
//! unmeasured prompt through: the caller sees `(false, 0)` and the error is
//! logged here, never raised past this boundary.

use crate::error::Pdf2QuizError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// A token-counting capability keyed to a model identifier.
///
/// Implemented by [`crate::provider::GeminiProvider`] in production and by
/// scripted mocks in tests.
#[async_trait]
pub trait TokenCounter: Send + Sync {
    /// Measure `text` in `model`'s token units.
    async fn count_tokens(&self, model: &str, text: &str) -> Result<usize, Pdf2QuizError>;
}

/// The budget gate: a counter plus the fixed model id and threshold.
#[derive(Clone)]
pub struct TokenBudget {
    counter: Arc<dyn TokenCounter>,
    model: String,
    max_tokens: usize,
}

impl TokenBudget {
    pub fn new(counter: Arc<dyn TokenCounter>, model: impl Into<String>, max_tokens: usize) -> Self {
        Self {
            counter,
            model: model.into(),
            max_tokens,
        }
    }

    /// The configured threshold.
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Whether `prompt` fits under the budget, with the measured count.
    ///
    /// Counter failure → `(false, 0)`: over budget, by policy.
    pub async fn fits(&self, prompt: &str) -> (bool, usize) {
        match self.counter.count_tokens(&self.model, prompt).await {
            Ok(measured) => {
                debug!(
                    "Prompt measures {} tokens (budget {})",
                    measured, self.max_tokens
                );
                (measured <= self.max_tokens, measured)
            }
            Err(e) => {
                warn!("Token counting failed, treating prompt as over budget: {e}");
                (false, 0)
            }
        }
    }
}
