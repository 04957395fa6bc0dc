//! CDP protocol types and message definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CdpError;

/// CDP request message.
#[derive(Debug, Serialize)]
pub struct CdpRequest {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// CDP response or event message.
#[derive(Debug, Deserialize)]
pub struct CdpResponse {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<CdpErrorResponse>,
    pub method: Option<String>,
    pub params: Option<Value>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// CDP error in response.
#[derive(Debug, Deserialize)]
pub struct CdpErrorResponse {
    pub code: i64,
    pub message: String,
    pub data: Option<String>,
}

/// Page info from the `/json` endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub page_type: String,
    pub title: String,
    pub url: String,
    pub web_socket_debugger_url: Option<String>,
}

impl PageInfo {
    /// Regular web page, as opposed to workers and extension backgrounds.
    pub fn is_page(&self) -> bool {
        self.page_type == "page"
    }
}

/// Browser version info.
///
/// Chrome returns PascalCase field names for this endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "Protocol-Version")]
    pub protocol_version: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

/// Result of `Page.getNavigationHistory`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationHistory {
    pub current_index: usize,
    pub entries: Vec<NavigationEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavigationEntry {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl NavigationHistory {
    /// Entry one step back, if any.
    pub fn previous(&self) -> Option<&NavigationEntry> {
        self.current_index
            .checked_sub(1)
            .and_then(|index| self.entries.get(index))
    }

    /// Entry one step forward, if any.
    pub fn next(&self) -> Option<&NavigationEntry> {
        self.entries.get(self.current_index + 1)
    }

    /// Where `go_back` should land. Fails at the oldest entry.
    pub fn back_target(&self) -> Result<&NavigationEntry, CdpError> {
        self.previous()
            .ok_or_else(|| CdpError::NavigationFailed("no previous page in history".to_string()))
    }

    /// Where `go_forward` should land. Fails at the newest entry.
    pub fn forward_target(&self) -> Result<&NavigationEntry, CdpError> {
        self.next()
            .ok_or_else(|| CdpError::NavigationFailed("no next page in history".to_string()))
    }
}

/// Screenshot format.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotFormat {
    Jpeg,
    Png,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
