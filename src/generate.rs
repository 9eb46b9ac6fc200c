//! Client for the generative text service.
//!
//! Everything above this module treats the service as a black box: a prompt
//! goes in, text or a [`GenerateError`] comes out. Callers decide what to
//! substitute on failure; nothing here retries.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerateError {
    #[error("text generation is not configured (set GEMINI_API_KEY)")]
    Disabled,
    #[error("text generation returned an empty response")]
    EmptyResponse,
    #[error("text generation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("text generation failed: {0}")]
    Other(String),
}

/// Prompt in, text out
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Reads `GEMINI_API_KEY` (or `API_KEY`) and `CODETYPER_API_BASE`.
    /// Returns `None` when no usable key is set.
    #[must_use]
    pub fn from_env(model: &str, timeout_secs: u64) -> Option<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("CODETYPER_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into());
        let model = if model.trim().is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            model.trim().to_string()
        };
        Some(Self {
            base_url,
            api_key: api_key.trim().to_string(),
            model,
            timeout: Duration::from_secs(timeout_secs.max(1)),
        })
    }
}

pub struct GeminiClient {
    client: Client,
    config: Option<GeminiConfig>,
}

impl GeminiClient {
    #[must_use]
    pub fn new(config: Option<GeminiConfig>) -> Self {
        let timeout = config
            .as_ref()
            .map_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS), |c| c.timeout);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, config }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let config = self.config.as_ref().ok_or(GenerateError::Disabled)?;

        let url = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );
        let payload = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!(model = %config.model, "sending generation request");
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &config.api_key)
            .json(&payload)
            .send()?;

        if !response.status().is_success() {
            return Err(GenerateError::HttpStatus(response.status()));
        }

        let body: GenerateResponse = response.json()?;
        let text = body.text().ok_or(GenerateError::EmptyResponse)?;
        Ok(text.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if it has any
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_disabled_client_fails_without_network() {
        let client = GeminiClient::new(None);

        assert!(!client.enabled());
        assert_matches!(client.generate("hello"), Err(GenerateError::Disabled));
    }

    #[test]
    fn test_response_text_joins_parts() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"fn main() {"},{"text":"}"}],"role":"model"}}]}"#,
        )
        .unwrap();

        assert_eq!(body.text().as_deref(), Some("fn main() {}"));
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let body: GenerateResponse = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
        assert_eq!(body.text(), None);

        let body: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert_eq!(body.text(), None);
    }

    #[test]
    fn test_request_shape() {
        let payload = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "hi".to_string(),
                }],
            }],
        };

        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"contents":[{"parts":[{"text":"hi"}]}]}"#
        );
    }
}
