//! Model definition types.

use serde::{Deserialize, Serialize};

/// Definition of an LLM model offered by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Model identifier.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Maximum context length in tokens.
    pub context_length: u32,

    /// Maximum output tokens.
    pub max_output_tokens: u32,

    /// Whether the model accepts image input.
    #[serde(default)]
    pub supports_vision: bool,
}

impl ModelDefinition {
    /// Create a new model definition.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            context_length: 200_000,
            max_output_tokens: 4096,
            supports_vision: false,
        }
    }

    /// Set context length.
    pub fn with_context_length(mut self, length: u32) -> Self {
        self.context_length = length;
        self
    }

    /// Set max output tokens.
    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = tokens;
        self
    }

    /// Enable vision support.
    pub fn with_vision(mut self) -> Self {
        self.supports_vision = true;
        self
    }
}
