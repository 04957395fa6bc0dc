//! In-flight execution bookkeeping.

use serde::{Deserialize, Serialize};

use crate::types::Millis;

/// What started an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionKind {
    Task,
    Message,
}

/// Log entry for a tool the model asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub name: String,
    #[serde(default)]
    pub input: serde_json::Value,
    pub timestamp: Millis,
}

/// Persisted state of a request that may outlive the UI that started it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionState {
    pub request_id: String,
    pub conversation_id: String,
    #[serde(rename = "type")]
    pub kind: ExecutionKind,
    pub start_time: Millis,
    pub last_activity: Millis,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRecord>,
    pub is_processing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<i64>,
}

impl ExecutionState {
    pub fn new(
        request_id: impl Into<String>,
        conversation_id: impl Into<String>,
        kind: ExecutionKind,
        tab_id: Option<i64>,
        now: Millis,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            conversation_id: conversation_id.into(),
            kind,
            start_time: now,
            last_activity: now,
            tool_calls: Vec::new(),
            is_processing: true,
            tab_id,
        }
    }

    /// Whether the state still describes live work at `now`.
    pub fn is_pending(&self, now: Millis, stale_after_ms: i64) -> bool {
        self.is_processing && now - self.last_activity < stale_after_ms
    }
}

/// Marker left behind when a click triggers a page navigation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub pending: bool,
    pub reopen_sidebar: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Millis>,
}
