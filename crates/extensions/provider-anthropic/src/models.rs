//! Anthropic model definitions.

use buddy_protocols::provider::ModelDefinition;

/// Claude models offered in the model picker.
pub fn get_models() -> Vec<ModelDefinition> {
    vec![
        ModelDefinition::new("claude-3-5-sonnet-20241022", "Claude 3.5 Sonnet")
            .with_max_output_tokens(8192)
            .with_vision(),
        ModelDefinition::new("claude-3-5-haiku-20241022", "Claude 3.5 Haiku")
            .with_max_output_tokens(8192),
        ModelDefinition::new("claude-3-opus-20240229", "Claude 3 Opus").with_vision(),
        ModelDefinition::new("claude-3-sonnet-20240229", "Claude 3 Sonnet").with_vision(),
        ModelDefinition::new("claude-3-haiku-20240307", "Claude 3 Haiku").with_vision(),
    ]
}
