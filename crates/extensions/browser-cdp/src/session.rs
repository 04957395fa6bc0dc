//! CDP page session for interacting with a single page.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::client::Connection;
use crate::error::CdpError;
use crate::host::PageDriver;
use crate::protocol::{NavigationEntry, NavigationHistory, ScreenshotFormat};

const LOAD_TIMEOUT: Duration = Duration::from_secs(30);
const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A session attached to a single page target.
pub struct PageSession {
    target_id: String,
    session_id: String,
    conn: Arc<Connection>,
}

impl PageSession {
    pub(crate) fn new(target_id: String, session_id: String, conn: Arc<Connection>) -> Self {
        Self {
            target_id,
            session_id,
            conn,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.conn.call(method, params, Some(&self.session_id)).await
    }

    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    /// Poll `document.readyState` until the page is usable.
    pub async fn wait_for_load(&self) -> Result<(), CdpError> {
        let start = Instant::now();
        loop {
            let state = self.evaluate("document.readyState").await?;
            if matches!(state.as_str(), Some("complete" | "interactive")) {
                return Ok(());
            }
            if start.elapsed() > LOAD_TIMEOUT {
                return Err(CdpError::Timeout("Page load timeout".to_string()));
            }
            tokio::time::sleep(LOAD_POLL_INTERVAL).await;
        }
    }

    pub async fn navigation_history(&self) -> Result<NavigationHistory, CdpError> {
        let history = self.call("Page.getNavigationHistory", None).await?;
        Ok(serde_json::from_value(history)?)
    }

    async fn go_to_entry(&self, entry: &NavigationEntry) -> Result<(), CdpError> {
        self.call(
            "Page.navigateToHistoryEntry",
            Some(json!({"entryId": entry.id})),
        )
        .await?;
        debug!("Moved to history entry {}", entry.url);
        self.wait_for_load().await
    }

    pub async fn screenshot(&self, format: ScreenshotFormat) -> Result<String, CdpError> {
        let result = self
            .call("Page.captureScreenshot", Some(json!({ "format": format })))
            .await?;

        result["data"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| CdpError::InvalidResponse("Missing screenshot data".to_string()))
    }
}

#[async_trait]
impl PageDriver for PageSession {
    async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["exception"]["description"]
                .as_str()
                .or_else(|| exception["text"].as_str())
                .unwrap_or("Unknown error");
            return Err(CdpError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }

    async fn navigate(&self, url: &str) -> Result<(), CdpError> {
        let result = self
            .call("Page.navigate", Some(json!({"url": url})))
            .await?;

        if let Some(error) = result.get("errorText").and_then(Value::as_str) {
            return Err(CdpError::NavigationFailed(error.to_string()));
        }

        self.wait_for_load().await?;
        debug!("Navigated to {}", url);
        Ok(())
    }

    async fn go_back(&self) -> Result<(), CdpError> {
        let history = self.navigation_history().await?;
        self.go_to_entry(history.back_target()?).await
    }

    async fn go_forward(&self) -> Result<(), CdpError> {
        let history = self.navigation_history().await?;
        self.go_to_entry(history.forward_target()?).await
    }

    async fn url(&self) -> Result<String, CdpError> {
        let result = self.evaluate("window.location.href").await?;
        Ok(result.as_str().unwrap_or_default().to_string())
    }

    async fn title(&self) -> Result<String, CdpError> {
        let result = self.evaluate("document.title").await?;
        Ok(result.as_str().unwrap_or_default().to_string())
    }

    async fn screenshot_png(&self) -> Result<String, CdpError> {
        self.screenshot(ScreenshotFormat::Png).await
    }
}
