//! Common utility types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata map type.
pub type Metadata = HashMap<String, serde_json::Value>;

/// Milliseconds since the Unix epoch, the timestamp unit of every persisted record.
pub type Millis = i64;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> Millis {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a fresh identifier for conversations, messages and requests.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Stop reason for a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    #[default]
    EndTurn,
    StopSequence,
    MaxTokens,
    ToolUse,
}

/// Token usage for a completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}
