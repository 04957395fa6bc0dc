//! Browser tool execution.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, warn};

use buddy_config::{BusConfig, ExecutorConfig};
use buddy_protocols::{
    BrowserActionResponse, BrowserTool, BusError, HostBus, NavigationState, OutboundMessage,
    TabController, TabId, ToolError, ToolRoute, now_millis,
};
use buddy_storage::StorageManager;

use crate::screenshot::downscale_data_url;

/// Runs a named tool against a tab.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(
        &self,
        tool_name: &str,
        input: &Value,
        tab: Option<TabId>,
    ) -> Result<String, ToolError>;
}

/// Executes the fixed browser tool set.
///
/// Navigation goes through the [`TabController`]; everything that touches
/// the DOM is sent to the page scripts as `EXECUTE_BROWSER_ACTION`.
pub struct BrowserToolExecutor {
    bus: Arc<dyn HostBus>,
    tabs: Arc<dyn TabController>,
    storage: Option<Arc<StorageManager>>,
    max_screenshot_width: u32,
    action_timeout: Duration,
}

impl BrowserToolExecutor {
    pub fn new(bus: Arc<dyn HostBus>, tabs: Arc<dyn TabController>) -> Self {
        Self::from_config(bus, tabs, &ExecutorConfig::default(), &BusConfig::default())
    }

    pub fn from_config(
        bus: Arc<dyn HostBus>,
        tabs: Arc<dyn TabController>,
        executor: &ExecutorConfig,
        bus_config: &BusConfig,
    ) -> Self {
        Self {
            bus,
            tabs,
            storage: None,
            max_screenshot_width: executor.max_screenshot_width,
            action_timeout: Duration::from_secs(bus_config.request_timeout_secs),
        }
    }

    /// Record a navigation marker when a click leaves the page.
    pub fn with_storage(mut self, storage: Arc<StorageManager>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    async fn navigate(&self, tool: BrowserTool, input: &Value, tab: TabId) -> Result<String, ToolError> {
        let unreachable = |e: BusError| ToolError::PageUnreachable(e.to_string());
        match tool {
            BrowserTool::NavigateBack => {
                self.tabs.go_back(tab).await.map_err(unreachable)?;
                Ok("Navigated back".to_string())
            }
            BrowserTool::NavigateForward => {
                self.tabs.go_forward(tab).await.map_err(unreachable)?;
                Ok("Navigated forward".to_string())
            }
            _ => {
                let target = required_str(input, "url")?;
                let parsed = url::Url::parse(target)
                    .map_err(|e| ToolError::InvalidParameters(format!("invalid url {target}: {e}")))?;
                self.tabs.navigate(tab, parsed.as_str()).await.map_err(unreachable)?;
                Ok(format!("Navigated to {target}"))
            }
        }
    }

    async fn page_action(&self, tool: BrowserTool, input: &Value, tab: TabId) -> Result<String, ToolError> {
        let params = action_params(tool, input)?;
        let message = OutboundMessage::ExecuteBrowserAction {
            action: tool.as_str().to_string(),
            params: params.clone(),
        };

        let reply = tokio::time::timeout(self.action_timeout, self.bus.send_to_tab(tab, message))
            .await
            .map_err(|_| ToolError::Timeout(self.action_timeout.as_secs()))?
            .map_err(|e| ToolError::PageUnreachable(format!("could not reach the page in tab {tab}: {e}")))?;

        let response: BrowserActionResponse = serde_json::from_value(reply).map_err(|e| {
            ToolError::PageUnreachable(format!("unexpected reply from tab {tab}: {e}"))
        })?;

        if !response.success {
            let error = response
                .error
                .unwrap_or_else(|| format!("{} failed", tool.as_str()));
            return Err(ToolError::ExecutionFailed(error));
        }

        if tool == BrowserTool::Click && navigates(response.result.as_ref()) {
            self.mark_navigation().await;
        }

        Ok(self.render_result(tool, &params, response.result))
    }

    async fn mark_navigation(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let state = NavigationState {
            pending: true,
            reopen_sidebar: true,
            timestamp: Some(now_millis()),
        };
        if let Err(e) = storage.set_navigation_state(Some(&state)).await {
            warn!("Failed to record navigation marker: {}", e);
        }
    }

    fn render_result(&self, tool: BrowserTool, params: &Value, result: Option<Value>) -> String {
        match (tool, result) {
            (BrowserTool::PageSnapshot, Some(Value::String(data_url))) => {
                downscale_data_url(&data_url, self.max_screenshot_width)
            }
            (_, Some(Value::String(text))) => text,
            (BrowserTool::Click, _) => {
                let target = params["elementId"]
                    .as_str()
                    .or_else(|| params["elementText"].as_str())
                    .unwrap_or_default();
                format!("Clicked on element: {target}")
            }
            (BrowserTool::TypeText, _) => {
                format!("Typed text: {}", params["text"].as_str().unwrap_or_default())
            }
            (BrowserTool::ScrollDown, _) => "Scrolled down".to_string(),
            (BrowserTool::ScrollUp, _) => "Scrolled up".to_string(),
            (_, Some(Value::Null)) | (_, None) => format!("{} completed", tool.as_str()),
            (_, Some(other)) => other.to_string(),
        }
    }
}

#[async_trait]
impl ToolExecutor for BrowserToolExecutor {
    async fn execute(
        &self,
        tool_name: &str,
        input: &Value,
        tab: Option<TabId>,
    ) -> Result<String, ToolError> {
        let tab = tab.ok_or(ToolError::NoContext)?;
        let tool: BrowserTool = tool_name.parse()?;
        debug!("Executing {} in tab {}", tool, tab);

        match tool.route() {
            ToolRoute::Tab => self.navigate(tool, input, tab).await,
            ToolRoute::PageScript => self.page_action(tool, input, tab).await,
        }
    }
}

fn required_str<'a>(input: &'a Value, field: &str) -> Result<&'a str, ToolError> {
    input
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::InvalidParameters(format!("missing required field `{field}`")))
}

/// Parameters the page scripts expect for each action.
fn action_params(tool: BrowserTool, input: &Value) -> Result<Value, ToolError> {
    match tool {
        BrowserTool::Click => {
            let element_text = input.get("element_text").and_then(Value::as_str);
            let element_id = input.get("element_id").and_then(Value::as_str);
            if element_text.is_none() && element_id.is_none() {
                return Err(ToolError::InvalidParameters(
                    "click needs `element_text` or `element_id`".to_string(),
                ));
            }
            let exact = input.get("exact").and_then(Value::as_bool).unwrap_or(true);
            Ok(json!({
                "elementText": element_text,
                "elementId": element_id,
                "exact": exact,
            }))
        }
        BrowserTool::TypeText => {
            let text = input
                .get("input_text")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ToolError::InvalidParameters("missing required field `input_text`".to_string())
                })?;
            Ok(json!({ "text": text }))
        }
        _ => Ok(json!({})),
    }
}

fn navigates(result: Option<&Value>) -> bool {
    result
        .and_then(|r| r.get("navigating"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
