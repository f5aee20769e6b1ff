// In crates/api-client/src/lib.rs

use app_config::LlmSettings;
use reqwest::StatusCode;
use std::time::Duration;

pub mod error;
pub mod prompt;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use types::*;

/// A minimal client for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f64,
    max_retries: u32,
    retry_backoff: Duration,
}

/// Constructs a new `LlmClient` from `LlmSettings`.
pub fn new(settings: &LlmSettings) -> Result<LlmClient> {
    LlmClient::new(settings)
}

impl LlmClient {
    /// Constructs a new `LlmClient` from `LlmSettings`.
    ///
    /// Fails if no API key is configured, so a misconfigured provider is
    /// reported before any request is attempted.
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let api_key = settings.resolved_api_key().ok_or(Error::MissingApiKey)?;
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_retries: settings.max_retries,
            retry_backoff: Duration::from_millis(settings.retry_backoff_ms),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a system + user prompt pair and returns the raw message content,
    /// which the model was asked to format as a JSON object.
    ///
    /// Transport failures, rate limits and server errors are retried up to
    /// `max_retries` times with a linearly growing delay.
    pub async fn complete_json(&self, system: &str, user: &str) -> Result<String> {
        let mut attempt: u32 = 0;
        loop {
            match self.send_once(system, user).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.retry_backoff * attempt;
                    tracing::warn!(attempt, ?delay, error = %e, "Chat completion failed, retrying.");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One `POST /chat/completions` round trip.
    async fn send_once(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat::json_object(),
        };

        tracing::debug!(model = %self.model, %url, "Sending chat completion request.");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        let status = response.status();
        let text = response.text().await.map_err(Error::RequestFailed)?;

        match status {
            StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimited),
            StatusCode::UNAUTHORIZED => Err(Error::Unauthorized),
            s if !s.is_success() => Err(Error::ApiError {
                status: s.as_u16(),
                msg: extract_error_message(&text),
            }),
            _ => parse_completion(&text),
        }
    }
}

/// Extracts the first choice's message content from a completion body.
pub fn parse_completion(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body).map_err(Error::DeserializationFailed)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(Error::MissingContent)
}

/// Pulls `error.message` out of an error body, or falls back to the raw text.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
