//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_infra;
mod schema_runtime;

pub use schema_infra::*;
pub use schema_runtime::*;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Buddy, a helpful AI assistant integrated into a Chrome browser extension. You help users interact with web content through various tasks like summarizing pages, rephrasing text, and answering questions. Be concise, helpful, and focused on the user's needs.";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    #[serde(default)]
    pub permissions: PermissionsConfig,

    #[serde(default)]
    pub execution: ExecutionConfig,

    #[serde(default)]
    pub executor: ExecutorConfig,

    #[serde(default)]
    pub bus: BusConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Anthropic API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    /// Overrides the stored key when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model used when settings do not select one.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            base_url: default_base_url(),
            api_version: default_api_version(),
        }
    }
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

/// Conversation loop limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Bound on each model request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Tool rounds allowed before giving up on a final answer.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Prior messages replayed as context.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            max_rounds: default_max_rounds(),
            history_window: default_history_window(),
            system_prompt: default_system_prompt(),
        }
    }
}

pub(crate) fn default_request_timeout() -> u64 {
    30
}

fn default_max_rounds() -> u32 {
    10
}

fn default_history_window() -> usize {
    10
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
