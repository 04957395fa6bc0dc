//! Host abstractions the runtime talks through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{OutboundMessage, TabId};
use crate::error::BusError;

/// Snapshot of a browser tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: TabId,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
}

/// Structured message passing to tabs and UI surfaces.
#[async_trait]
pub trait HostBus: Send + Sync {
    /// Send a message to the scripts in a tab and wait for the reply.
    async fn send_to_tab(&self, tab: TabId, message: OutboundMessage) -> Result<Value, BusError>;

    /// Fire-and-forget notification to every listening surface.
    async fn broadcast(&self, message: OutboundMessage) -> Result<(), BusError>;
}

/// Tab-level operations that do not go through page scripts.
#[async_trait]
pub trait TabController: Send + Sync {
    async fn tab_info(&self, tab: TabId) -> Result<TabInfo, BusError>;

    async fn go_back(&self, tab: TabId) -> Result<(), BusError>;

    async fn go_forward(&self, tab: TabId) -> Result<(), BusError>;

    async fn navigate(&self, tab: TabId, url: &str) -> Result<(), BusError>;

    /// Capture the visible area of the tab as a `data:image/png;base64,` URL.
    async fn capture_visible_tab(&self, tab: TabId) -> Result<String, BusError>;

    /// Open a new tab at `url`.
    async fn open_tab(&self, url: &str) -> Result<TabId, BusError>;
}
