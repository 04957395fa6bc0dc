//! Message and tool conversion utilities.

use buddy_protocols::provider::CompletionRequest;
use buddy_protocols::types::{ContentPart, Message, MessageContent, MessageRole};

use crate::api::{ApiContent, ApiMessage, ApiTool, ContentBlock};

/// Convert messages to Anthropic API format.
pub fn convert_messages(messages: &[Message]) -> Vec<ApiMessage> {
    messages
        .iter()
        .map(|m| ApiMessage {
            role: match m.role {
                MessageRole::User => "user".to_string(),
                MessageRole::Assistant => "assistant".to_string(),
            },
            content: convert_content(&m.content),
        })
        .collect()
}

/// Convert a single message's content.
pub fn convert_content(content: &MessageContent) -> ApiContent {
    match content {
        MessageContent::Text(text) => ApiContent::Text(text.clone()),
        MessageContent::Parts(parts) => ApiContent::Blocks(parts.iter().map(convert_part).collect()),
    }
}

fn convert_part(part: &ContentPart) -> ContentBlock {
    match part {
        ContentPart::Text { text } => ContentBlock::Text { text: text.clone() },
        ContentPart::ToolUse { id, name, input } => ContentBlock::ToolUse {
            id: id.clone(),
            name: name.clone(),
            input: input.clone(),
        },
        ContentPart::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => ContentBlock::ToolResult {
            tool_use_id: tool_use_id.clone(),
            content: content.clone(),
            is_error: *is_error,
        },
    }
}

/// Convert tools to Anthropic API format.
pub fn convert_tools(request: &CompletionRequest) -> Vec<ApiTool> {
    request
        .tools
        .iter()
        .map(|t| ApiTool {
            name: t.name.clone(),
            description: t.description.clone(),
            input_schema: t.input_schema.clone(),
        })
        .collect()
}

#[cfg(test)]
#[path = "converter_tests.rs"]
mod tests;
