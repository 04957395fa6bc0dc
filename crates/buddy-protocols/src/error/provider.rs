//! LLM provider errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited: retry after {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Context length exceeded: {0}")]
    ContextLengthExceeded(String),

    #[error("Content filtered: {0}")]
    ContentFiltered(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Classify a non-success HTTP response from a model API.
    pub fn from_api_response(status: u16, message: String) -> Self {
        let lower = message.to_lowercase();
        match status {
            401 | 403 => ProviderError::AuthenticationFailed(message),
            429 => ProviderError::RateLimited {
                retry_after_seconds: 60,
            },
            400 | 413 if is_context_length_message(&lower) => {
                ProviderError::ContextLengthExceeded(message)
            }
            400 if lower.contains("content filter")
                || lower.contains("safety")
                || lower.contains("blocked") =>
            {
                ProviderError::ContentFiltered(message)
            }
            _ => ProviderError::ApiError { status, message },
        }
    }

    /// Whether the caller could reasonably try again later.
    ///
    /// Nothing in the assistant retries automatically; this only shapes the
    /// wording shown to the user.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. } | ProviderError::Network(_)
        ) || matches!(self, ProviderError::ApiError { status, .. } if *status >= 500)
    }
}

fn is_context_length_message(lower: &str) -> bool {
    lower.contains("context length")
        || lower.contains("too many tokens")
        || lower.contains("prompt is too long")
        || (lower.contains("tokens") && lower.contains("exceed"))
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
