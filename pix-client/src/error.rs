//! Provider client errors

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PixError {
    /// Token exchange rejected, or the API answered 401
    #[error("Provider authentication failed: {0}")]
    Auth(String),

    /// Non-2xx answer; `body` is the provider's error payload
    #[error("Provider request failed with status {status}")]
    Request { status: u16, body: Value },

    #[error("Provider request timed out")]
    Timeout,

    /// Transport failure (connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PixError {
    /// Whether the caller may retry the same operation later
    pub fn is_retryable(&self) -> bool {
        match self {
            PixError::Timeout => true,
            PixError::Http(e) => e.is_connect(),
            PixError::Request { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for PixError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PixError::Timeout
        } else {
            PixError::Http(e)
        }
    }
}

pub type PixResult<T> = Result<T, PixError>;
