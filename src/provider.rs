//! Generation provider: a thin reqwest client for the Gemini REST API.
//!
//! One provider implements both external capabilities the pipeline needs —
//! [`TextGenerator`] via `models/{model}:generateContent` and
//! [`TokenCounter`] via `models/{model}:countTokens` — so generation and
//! counting are always keyed to the same model and credentials.
//!
//! Deliberately retry-free: transient failures propagate to the
//! orchestrator, which fails the request as a whole. Retrying here would
//! silently multiply calls under the shared rate gate.

use crate::config::GenerationConfig;
use crate::error::Pdf2QuizError;
use crate::pipeline::budget::TokenCounter;
use crate::pipeline::llm::TextGenerator;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Client for Gemini's `generateContent` and `countTokens` endpoints.
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_output_tokens: usize,
}

impl GeminiProvider {
    /// Build a provider from the run configuration.
    ///
    /// The API key comes from `config.api_key`, falling back to the
    /// `GEMINI_API_KEY` environment variable.
    pub fn new(config: &GenerationConfig) -> Result<Self, Pdf2QuizError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Pdf2QuizError::ProviderNotConfigured {
                hint: "set GEMINI_API_KEY or configure api_key".into(),
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| Pdf2QuizError::Internal(format!("http client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Point the provider at a different endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn post_json(
        &self,
        model: &str,
        verb: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, reqwest::Error> {
        let url = format!(
            "{}/models/{}:{}?key={}",
            self.base_url, model, verb, self.api_key
        );
        let resp = self.http.post(url).json(&body).send().await?;
        let resp = resp.error_for_status()?;
        resp.json().await
    }
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, Pdf2QuizError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_output_tokens,
            },
        });

        let v = self
            .post_json(&self.model, "generateContent", body)
            .await
            .map_err(|e| Pdf2QuizError::GenerationFailed {
                detail: e.to_string(),
            })?;

        let text: String = v
            .pointer("/candidates/0/content/parts")
            .and_then(|p| p.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Pdf2QuizError::GenerationFailed {
                detail: format!("response contained no candidate text: {v}"),
            });
        }

        debug!("Generation call returned {} chars", text.len());
        Ok(text)
    }
}

#[async_trait]
impl TokenCounter for GeminiProvider {
    async fn count_tokens(&self, model: &str, text: &str) -> Result<usize, Pdf2QuizError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": text }] }],
        });

        let v = self
            .post_json(model, "countTokens", body)
            .await
            .map_err(|e| Pdf2QuizError::TokenCountFailed {
                detail: e.to_string(),
            })?;

        v.get("totalTokens")
            .and_then(|t| t.as_u64())
            .map(|t| t as usize)
            .ok_or_else(|| Pdf2QuizError::TokenCountFailed {
                detail: format!("response missing totalTokens: {v}"),
            })
    }
}
