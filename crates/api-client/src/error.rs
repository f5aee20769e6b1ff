// In crates/api-client/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to build the API client: {0}")]
    ClientBuildError(String),
    #[error("No API key configured (set llm.api_key or OPENAI_API_KEY)")]
    MissingApiKey,
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(#[from] serde_json::Error),
    #[error("Rate limited by the API")]
    RateLimited,
    #[error("Authentication rejected by the API")]
    Unauthorized,
    #[error("API error: status {status}, msg: {msg}")]
    ApiError { status: u16, msg: String },
    #[error("Completion response contained no message content")]
    MissingContent,
}

impl Error {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RequestFailed(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Error::RateLimited => true,
            Error::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
