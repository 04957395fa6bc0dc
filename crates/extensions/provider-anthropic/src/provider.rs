//! Anthropic provider implementation.

use async_trait::async_trait;
use tracing::debug;

use buddy_protocols::error::ProviderError;
use buddy_protocols::provider::{
    CompletionRequest, CompletionResponse, LLMProvider, ModelDefinition,
};

use crate::api::{ApiRequest, ApiResponse};
use crate::converter::{convert_messages, convert_tools};
use crate::models::get_models;
use crate::parser::parse_response;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Anthropic LLM provider.
pub struct AnthropicProvider {
    api_key: String,
    base_url: String,
    api_version: String,
    client: reqwest::Client,
    models: Vec<ModelDefinition>,
}

impl AnthropicProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Create provider against a custom endpoint (proxies, tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            client: reqwest::Client::new(),
            models: get_models(),
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn build_request(&self, request: &CompletionRequest) -> ApiRequest {
        ApiRequest {
            model: request.model.clone(),
            messages: convert_messages(&request.messages),
            system: request.system.clone(),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature,
            tools: convert_tools(request),
        }
    }

    async fn send_request(&self, api_request: &ApiRequest) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .header("content-type", "application/json")
            .json(api_request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            // Error bodies look like {"error": {"type": "...", "message": "..."}}
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or(body);
            return Err(ProviderError::from_api_response(status, message));
        }

        Ok(response)
    }

    /// Check the key with a minimal request.
    pub async fn validate_key(&self, model: &str) -> Result<(), ProviderError> {
        self.validate_credentials(model).await
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn id(&self) -> &str {
        "anthropic"
    }

    fn models(&self) -> &[ModelDefinition] {
        &self.models
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let api_request = self.build_request(&request);
        debug!(
            model = %api_request.model,
            messages = api_request.messages.len(),
            tools = api_request.tools.len(),
            "Sending Anthropic request"
        );

        let response = self.send_request(&api_request).await?;
        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        Ok(parse_response(api_response))
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
