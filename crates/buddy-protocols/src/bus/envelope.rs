//! Wire envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A typed message on the host bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusEnvelope {
    #[serde(rename = "type")]
    pub message_type: String,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl BusEnvelope {
    pub fn new(message_type: impl Into<String>, data: Value) -> Self {
        Self {
            message_type: message_type.into(),
            data,
        }
    }

    /// Envelope without a payload.
    pub fn bare(message_type: impl Into<String>) -> Self {
        Self::new(message_type, Value::Null)
    }
}

/// Standard failure body returned to the sender.
pub fn failure_response(error: impl std::fmt::Display) -> Value {
    serde_json::json!({ "success": false, "error": error.to_string() })
}

/// Standard success body with no payload.
pub fn success_response() -> Value {
    serde_json::json!({ "success": true })
}
