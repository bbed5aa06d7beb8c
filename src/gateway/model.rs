//! Multimodal model backend.
//!
//! The gateway talks to the model through the [`ModelBackend`] trait so tests
//! can substitute a canned backend. The production implementation calls the
//! Gemini `generateContent` REST API with the prompt and the inline PNG.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ModelConfig;

/// Errors from the upstream model call.
///
/// These never cross the gateway boundary; the gateway folds them into a
/// synthetic result item.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("API key environment variable {var} is not set")]
    MissingApiKey { var: String },
    #[error("Model request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Model returned HTTP {status}: {body}")]
    BadStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Model response contained no text: {detail}")]
    EmptyResponse { detail: String },
}

/// A multimodal model that can interpret a snapshot image
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Run the prompt against the image and return the raw response text
    async fn generate(&self, prompt: &str, png_base64: &str) -> Result<String, ModelError>;
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    /// Resolved at construction; a missing key fails per-request, not at
    /// startup, so credential problems surface as synthetic result items
    api_key: Option<String>,
    api_key_env: String,
}

impl GeminiClient {
    /// Create a client from configuration, reading the API key from the
    /// configured environment variable if it is set
    pub fn from_config(config: &ModelConfig) -> Result<Self, ModelError> {
        let api_key = std::env::var(&config.api_key_env).ok();

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
        })
    }

    /// Whether an API key was found at construction
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ModelBackend for GeminiClient {
    async fn generate(&self, prompt: &str, png_base64: &str) -> Result<String, ModelError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| ModelError::MissingApiKey {
            var: self.api_key_env.clone(),
        })?;

        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        debug!("Calling model {} at {}", self.model, self.endpoint);

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/png".to_string(),
                            data: png_base64.to_string(),
                        },
                    },
                ],
            }],
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::BadStatus { status, body });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| ModelError::EmptyResponse {
                detail: "no text candidates".to_string(),
            })
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
