//! LLM provider trait definitions.

use std::sync::Arc;

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, ModelDefinition};
use crate::error::ProviderError;
use crate::types::Message;

/// Core trait for LLM providers.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Returns the provider ID.
    fn id(&self) -> &str;

    /// Returns the available models.
    fn models(&self) -> &[ModelDefinition];

    /// Generate a completion.
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionResponse, ProviderError>;

    /// Check that the configured credential is accepted.
    async fn validate_credentials(&self, model: &str) -> Result<(), ProviderError> {
        let request =
            CompletionRequest::new(model, vec![Message::user("Hello")]).with_max_tokens(16);
        self.complete(request).await.map(|_| ())
    }
}

/// Builds providers on demand so the credential and model can change at runtime.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, api_key: &str) -> Arc<dyn LLMProvider>;
}
