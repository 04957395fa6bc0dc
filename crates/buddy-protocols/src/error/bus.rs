//! Host message bus errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),

    #[error("Invalid payload for {message_type}: {reason}")]
    InvalidPayload { message_type: String, reason: String },

    #[error("No receiver in tab {0}")]
    NoReceiver(i64),

    #[error("Message delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("No response within {0} seconds")]
    Timeout(u64),

    #[error("Unsupported by this host: {0}")]
    Unsupported(String),
}
