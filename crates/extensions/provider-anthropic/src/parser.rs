//! Response parsing utilities.

use buddy_protocols::provider::CompletionResponse;
use buddy_protocols::types::{ContentPart, StopReason, Usage};

use crate::api::{ApiResponse, ContentBlock};

/// Parse API response to CompletionResponse, keeping block order.
pub fn parse_response(response: ApiResponse) -> CompletionResponse {
    let content = response
        .content
        .into_iter()
        .map(|block| match block {
            ContentBlock::Text { text } => ContentPart::Text { text },
            ContentBlock::ToolUse { id, name, input } => ContentPart::ToolUse { id, name, input },
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => ContentPart::ToolResult {
                tool_use_id,
                content,
                is_error,
            },
        })
        .collect();

    CompletionResponse {
        id: response.id,
        model: response.model,
        content,
        stop_reason: response
            .stop_reason
            .as_deref()
            .map(parse_stop_reason)
            .unwrap_or_default(),
        usage: Usage {
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
        },
    }
}

/// Parse stop reason string.
pub fn parse_stop_reason(reason: &str) -> StopReason {
    match reason {
        "end_turn" => StopReason::EndTurn,
        "max_tokens" => StopReason::MaxTokens,
        "tool_use" => StopReason::ToolUse,
        "stop_sequence" => StopReason::StopSequence,
        _ => StopReason::EndTurn,
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
