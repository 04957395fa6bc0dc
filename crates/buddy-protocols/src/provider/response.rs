//! Completion response types.

use serde::{Deserialize, Serialize};

use crate::types::{ContentPart, Message, MessageRole, StopReason, ToolCall, Usage};

/// Response from a completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Unique ID for this completion.
    pub id: String,

    /// Model used.
    pub model: String,

    /// Content blocks in the order the model produced them.
    pub content: Vec<ContentPart>,

    /// Reason for stopping.
    pub stop_reason: StopReason,

    /// Token usage.
    #[serde(default)]
    pub usage: Usage,
}

impl CompletionResponse {
    /// Text of the first text block, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|part| match part {
            ContentPart::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Tool uses requested by the model, in response order.
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.content.iter().filter_map(ToolCall::from_part).collect()
    }

    /// The response as an assistant turn, echoing every block.
    pub fn to_message(&self) -> Message {
        Message::with_parts(MessageRole::Assistant, self.content.clone())
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
