//! Generative-text proxy client
//!
//! Forwards a single prompt to the Gemini `generateContent` endpoint and pulls
//! the first candidate's text out of the reply. No conversation state is kept.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Text returned when the provider replies without any candidate text
pub const EMPTY_RESPONSE_TEXT: &str = "No text response from the model.";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Header carrying the API key; the key never appears in request URLs
pub const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Error, Debug)]
pub enum GeminiError {
    /// Provider answered with a non-success status
    #[error("Provider returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Provider request timed out after {0}s")]
    Timeout(u64),

    #[error("Provider unreachable: {0}")]
    Transport(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Connection settings for the provider
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Successful completion
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    /// Provider response body, passed through untouched
    pub raw: Value,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GeminiError::Client(e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Send one prompt and return the first candidate's text
    pub async fn generate(&self, prompt: &str) -> Result<Completion, GeminiError> {
        let payload = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!(model = %self.config.model, prompt_len = prompt.len(), "Forwarding prompt");

        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let raw: Value = serde_json::from_str(&body).unwrap_or(Value::String(body));

        if !status.is_success() {
            let message = upstream_message(&raw);
            warn!(status = status.as_u16(), %message, "Provider rejected prompt");
            return Err(GeminiError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let text = candidate_text(&raw)
            .filter(|t| !t.is_empty())
            .unwrap_or(EMPTY_RESPONSE_TEXT)
            .to_string();

        Ok(Completion { text, raw })
    }

    /// Errors are rendered without the request URL before they reach logs
    /// or callers.
    fn transport_error(&self, err: reqwest::Error) -> GeminiError {
        if err.is_timeout() {
            GeminiError::Timeout(self.config.timeout_secs)
        } else {
            GeminiError::Transport(err.without_url().to_string())
        }
    }
}

/// `candidates[0].content.parts[0].text`, when present
fn candidate_text(raw: &Value) -> Option<&str> {
    raw.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
}

/// Best human-readable message from a provider error body
fn upstream_message(raw: &Value) -> String {
    raw.pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| match raw {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Null => "Unknown error".to_string(),
            other => other.to_string(),
        })
}
