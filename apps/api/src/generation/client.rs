//! Generation client — the single point of entry for cover-letter text
//! generation. Wraps the Cohere chat API.
//!
//! The client makes exactly one call per invocation; retry, backoff and
//! fallback policy live in the generator's state machine, not here.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const COHERE_API_URL: &str = "https://api.cohere.com/v1/chat";
/// The model used for all generation calls.
pub const MODEL: &str = "command-r";
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("generation service returned empty text")]
    EmptyContent,
}

/// Seam for the external text-generation service. The production backend is
/// [`CohereClient`]; tests substitute stubs.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    message: &'a str,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CohereError {
    #[serde(default)]
    message: Option<String>,
}

pub struct CohereClient {
    client: Client,
    api_key: String,
}

impl CohereClient {
    pub fn new(api_key: String, timeout_secs: u64) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()?,
            api_key,
        })
    }
}

#[async_trait]
impl GenerationBackend for CohereClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request_body = ChatRequest {
            model: MODEL,
            message: prompt,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(COHERE_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<CohereError>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(body);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(GenerationError::Http)?;

        let text = chat
            .text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(GenerationError::EmptyContent)?;

        debug!("generation call succeeded ({} chars)", text.len());
        Ok(text)
    }
}
