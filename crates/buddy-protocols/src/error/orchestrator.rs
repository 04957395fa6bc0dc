//! Conversation orchestration errors.

use thiserror::Error;

use super::ProviderError;

/// Message shown when no credential is configured.
pub const NOT_CONFIGURED_MESSAGE: &str =
    "API key not configured. Please set your Anthropic API key in settings.";

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("{msg}", msg = NOT_CONFIGURED_MESSAGE)]
    NotConfigured,

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Model kept requesting tools after {0} rounds without a final answer")]
    MaxRoundsExceeded(u32),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
