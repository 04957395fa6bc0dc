//! Provider construction from stored credentials.

use std::sync::Arc;

use buddy_protocols::provider::{LLMProvider, ProviderFactory};

use crate::AnthropicProvider;

/// Builds [`AnthropicProvider`]s sharing one endpoint configuration.
#[derive(Debug, Clone)]
pub struct AnthropicProviderFactory {
    base_url: String,
    api_version: String,
}

impl AnthropicProviderFactory {
    pub fn new(base_url: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_version: api_version.into(),
        }
    }
}

impl Default for AnthropicProviderFactory {
    fn default() -> Self {
        Self::new(crate::DEFAULT_BASE_URL, crate::DEFAULT_API_VERSION)
    }
}

impl ProviderFactory for AnthropicProviderFactory {
    fn create(&self, api_key: &str) -> Arc<dyn LLMProvider> {
        Arc::new(
            AnthropicProvider::with_base_url(api_key.to_string(), self.base_url.clone())
                .with_api_version(self.api_version.clone()),
        )
    }
}
