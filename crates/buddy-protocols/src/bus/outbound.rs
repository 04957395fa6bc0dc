//! Messages the runtime sends to tabs and UI surfaces.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::BusEnvelope;
use crate::records::ExecutionState;
use crate::types::ToolCall;

/// Answer to a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionChoice {
    Deny,
    AllowOnce,
    AllowSession,
}

impl PermissionChoice {
    /// Parse a prompt reply. Anything unrecognised counts as a denial.
    pub fn from_reply(reply: &Value) -> Self {
        match reply.get("permission").and_then(Value::as_str) {
            Some("allow_once") => PermissionChoice::AllowOnce,
            Some("allow_session") => PermissionChoice::AllowSession,
            _ => PermissionChoice::Deny,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionChoice::Deny => "deny",
            PermissionChoice::AllowOnce => "allow_once",
            PermissionChoice::AllowSession => "allow_session",
        }
    }
}

/// Reply from a page script to `EXECUTE_BROWSER_ACTION`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserActionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BrowserActionResponse {
    pub fn ok(result: impl Into<Value>) -> Self {
        Self {
            success: true,
            result: Some(result.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

pub const TOOL_PERMISSION_REQUEST: &str = "TOOL_PERMISSION_REQUEST";

#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// Live notification that the model asked for a tool.
    ToolCallUpdate {
        request_id: String,
        tool_call: ToolCall,
    },
    RestoreExecutionState(ExecutionState),
    /// Ask the sidebar in a tab whether a tool may run.
    PermissionRequest {
        tool_name: String,
        request_id: String,
    },
    ExecuteBrowserAction {
        action: String,
        params: Value,
    },
    SiteBlacklisted {
        url: String,
    },
}

impl OutboundMessage {
    pub fn message_type(&self) -> &'static str {
        match self {
            OutboundMessage::ToolCallUpdate { .. } => "TOOL_CALL_UPDATE",
            OutboundMessage::RestoreExecutionState(_) => "RESTORE_EXECUTION_STATE",
            OutboundMessage::PermissionRequest { .. } => "FORWARD_TO_SIDEBAR",
            OutboundMessage::ExecuteBrowserAction { .. } => "EXECUTE_BROWSER_ACTION",
            OutboundMessage::SiteBlacklisted { .. } => "SITE_BLACKLISTED",
        }
    }

    pub fn to_envelope(&self) -> BusEnvelope {
        let data = match self {
            OutboundMessage::ToolCallUpdate {
                request_id,
                tool_call,
            } => json!({
                "requestId": request_id,
                "toolCall": {
                    "id": tool_call.id,
                    "name": tool_call.name,
                    "input": tool_call.input,
                },
            }),
            OutboundMessage::RestoreExecutionState(state) => {
                serde_json::to_value(state).unwrap_or(Value::Null)
            }
            OutboundMessage::PermissionRequest {
                tool_name,
                request_id,
            } => json!({
                "type": TOOL_PERMISSION_REQUEST,
                "toolName": tool_name,
                "requestId": request_id,
            }),
            OutboundMessage::ExecuteBrowserAction { action, params } => json!({
                "action": action,
                "params": params,
            }),
            OutboundMessage::SiteBlacklisted { url } => json!({ "url": url }),
        };
        BusEnvelope::new(self.message_type(), data)
    }
}
