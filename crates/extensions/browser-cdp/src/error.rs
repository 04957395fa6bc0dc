//! CDP error types.

use thiserror::Error;

use buddy_protocols::BusError;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Error object returned for a command.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error during endpoint discovery.
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("No page to attach to at {0}")]
    NoPage(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// Exception thrown by an evaluated script.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}

impl From<CdpError> for BusError {
    fn from(e: CdpError) -> Self {
        BusError::DeliveryFailed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_wording() {
        let err = CdpError::Protocol {
            code: -32000,
            message: "Cannot navigate to invalid URL".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "CDP error: Cannot navigate to invalid URL (code: -32000)"
        );
    }

    #[test]
    fn test_bus_error_keeps_message() {
        let bus: BusError = CdpError::SessionClosed.into();
        assert_eq!(bus.to_string(), "Message delivery failed: Session closed");
    }

    #[test]
    fn test_url_error_is_connection_failure() {
        let err: CdpError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, CdpError::ConnectionFailed(_)));
    }
}
