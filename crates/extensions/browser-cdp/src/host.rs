//! Host bus and tab controller backed by a single attached page.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use buddy_protocols::{
    BrowserActionResponse, BrowserTool, BusEnvelope, BusError, HostBus, OutboundMessage,
    PermissionChoice, TabController, TabId, TabInfo,
};

use crate::client::CdpClient;
use crate::error::CdpError;
use crate::scripts::{action_script, invocation};

/// Tab id reported for the attached page.
pub const ATTACHED_TAB: TabId = 1;

const EVENT_CAPACITY: usize = 64;

/// Operations the host needs from the attached page.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Evaluate an expression, awaiting promises, and return its value.
    async fn evaluate(&self, expression: &str) -> Result<Value, CdpError>;

    async fn navigate(&self, url: &str) -> Result<(), CdpError>;

    async fn go_back(&self) -> Result<(), CdpError>;

    async fn go_forward(&self) -> Result<(), CdpError>;

    async fn url(&self) -> Result<String, CdpError>;

    async fn title(&self) -> Result<String, CdpError>;

    /// Base64 PNG of the visible viewport.
    async fn screenshot_png(&self) -> Result<String, CdpError>;
}

/// Answers tool permission prompts on behalf of the sidebar.
#[async_trait]
pub trait PermissionPrompter: Send + Sync {
    async fn prompt(&self, tool_name: &str, request_id: &str) -> PermissionChoice;
}

/// Opens tabs beside the attached one.
#[async_trait]
pub trait TabOpener: Send + Sync {
    async fn open(&self, url: &str) -> Result<(), CdpError>;
}

#[async_trait]
impl TabOpener for CdpClient {
    async fn open(&self, url: &str) -> Result<(), CdpError> {
        self.new_page(Some(url)).await.map(|_| ())
    }
}

pub struct CdpHost {
    page: Arc<dyn PageDriver>,
    prompter: Arc<dyn PermissionPrompter>,
    opener: Option<Arc<dyn TabOpener>>,
    events: broadcast::Sender<BusEnvelope>,
    next_tab: AtomicI64,
}

impl CdpHost {
    pub fn new(page: Arc<dyn PageDriver>, prompter: Arc<dyn PermissionPrompter>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            page,
            prompter,
            opener: None,
            events,
            next_tab: AtomicI64::new(ATTACHED_TAB + 1),
        }
    }

    pub fn with_opener(mut self, opener: Arc<dyn TabOpener>) -> Self {
        self.opener = Some(opener);
        self
    }

    /// Receive every broadcast and every tab notification the host delivers.
    pub fn subscribe(&self) -> broadcast::Receiver<BusEnvelope> {
        self.events.subscribe()
    }

    fn check_tab(&self, tab: TabId) -> Result<(), BusError> {
        if tab == ATTACHED_TAB {
            Ok(())
        } else {
            Err(BusError::NoReceiver(tab))
        }
    }

    fn publish(&self, message: &OutboundMessage) {
        // No subscribers is fine.
        let _ = self.events.send(message.to_envelope());
    }

    async fn run_action(&self, action: &str, params: &Value) -> BrowserActionResponse {
        let tool: BrowserTool = match action.parse() {
            Ok(tool) => tool,
            Err(e) => return BrowserActionResponse::failed(format!("{e}")),
        };

        if tool == BrowserTool::PageSnapshot {
            return match self.page.screenshot_png().await {
                Ok(data) => BrowserActionResponse::ok(png_data_url(&data)),
                Err(e) => BrowserActionResponse::failed(e.to_string()),
            };
        }

        let Some(script) = action_script(tool) else {
            return BrowserActionResponse::failed(format!("{action} is not a page action"));
        };

        match self.page.evaluate(&invocation(script, params)).await {
            Ok(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                BrowserActionResponse::failed(format!("unexpected result from {action}: {e}"))
            }),
            Err(e) => BrowserActionResponse::failed(e.to_string()),
        }
    }
}

#[async_trait]
impl HostBus for CdpHost {
    async fn send_to_tab(&self, tab: TabId, message: OutboundMessage) -> Result<Value, BusError> {
        self.check_tab(tab)?;
        debug!("Delivering {} to tab {}", message.message_type(), tab);

        match &message {
            OutboundMessage::PermissionRequest {
                tool_name,
                request_id,
            } => {
                let choice = self.prompter.prompt(tool_name, request_id).await;
                info!("Permission for {}: {}", tool_name, choice.as_str());
                Ok(serde_json::json!({ "permission": choice.as_str() }))
            }
            OutboundMessage::ExecuteBrowserAction { action, params } => {
                let response = self.run_action(action, params).await;
                if let Some(error) = &response.error {
                    warn!("{} failed in page: {}", action, error);
                }
                serde_json::to_value(response)
                    .map_err(|e| BusError::DeliveryFailed(e.to_string()))
            }
            _ => {
                self.publish(&message);
                Ok(Value::Null)
            }
        }
    }

    async fn broadcast(&self, message: OutboundMessage) -> Result<(), BusError> {
        self.publish(&message);
        Ok(())
    }
}

#[async_trait]
impl TabController for CdpHost {
    async fn tab_info(&self, tab: TabId) -> Result<TabInfo, BusError> {
        self.check_tab(tab)?;
        Ok(TabInfo {
            id: tab,
            url: self.page.url().await?,
            title: self.page.title().await?,
        })
    }

    async fn go_back(&self, tab: TabId) -> Result<(), BusError> {
        self.check_tab(tab)?;
        Ok(self.page.go_back().await?)
    }

    async fn go_forward(&self, tab: TabId) -> Result<(), BusError> {
        self.check_tab(tab)?;
        Ok(self.page.go_forward().await?)
    }

    async fn navigate(&self, tab: TabId, url: &str) -> Result<(), BusError> {
        self.check_tab(tab)?;
        Ok(self.page.navigate(url).await?)
    }

    async fn capture_visible_tab(&self, tab: TabId) -> Result<String, BusError> {
        self.check_tab(tab)?;
        Ok(png_data_url(&self.page.screenshot_png().await?))
    }

    async fn open_tab(&self, url: &str) -> Result<TabId, BusError> {
        let opener = self
            .opener
            .as_ref()
            .ok_or_else(|| BusError::Unsupported("opening tabs".to_string()))?;
        opener.open(url).await?;
        Ok(self.next_tab.fetch_add(1, Ordering::SeqCst))
    }
}

fn png_data_url(base64: &str) -> String {
    format!("data:image/png;base64,{}", base64)
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
