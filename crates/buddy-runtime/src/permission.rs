//! Per-tool permission gate.
//!
//! The first use of a tool asks the user through the sidebar of the tab the
//! request came from. "Allow for session" and "Deny" answers are remembered
//! until [`PermissionGate::clear_session`] or a process restart; "Allow once"
//! is never remembered.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use buddy_config::PermissionsConfig;
use buddy_protocols::{HostBus, OutboundMessage, PermissionChoice, TabId};

/// Outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    Allowed,
    Denied,
}

impl PermissionDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PermissionDecision::Allowed)
    }
}

/// Strategy the orchestrator consults before running a tool.
#[async_trait]
pub trait PermissionCheck: Send + Sync {
    async fn check(&self, tool_name: &str, tab: Option<TabId>, request_id: &str)
        -> PermissionDecision;
}

#[derive(Debug, Default)]
struct PermissionState {
    session_allowed: HashSet<String>,
    denied: HashSet<String>,
}

/// Session-scoped permission cache backed by a sidebar prompt.
pub struct PermissionGate {
    bus: Arc<dyn HostBus>,
    exempt: HashSet<String>,
    prompt_timeout: Duration,
    state: Mutex<PermissionState>,
}

impl PermissionGate {
    pub fn new(bus: Arc<dyn HostBus>) -> Self {
        Self::from_config(bus, &PermissionsConfig::default())
    }

    pub fn from_config(bus: Arc<dyn HostBus>, config: &PermissionsConfig) -> Self {
        Self {
            bus,
            exempt: config.exempt_tools.iter().cloned().collect(),
            prompt_timeout: Duration::from_secs(config.prompt_timeout_secs),
            state: Mutex::new(PermissionState::default()),
        }
    }

    pub fn with_prompt_timeout(mut self, timeout: Duration) -> Self {
        self.prompt_timeout = timeout;
        self
    }

    pub fn is_session_allowed(&self, tool_name: &str) -> bool {
        self.state.lock().session_allowed.contains(tool_name)
    }

    pub fn is_denied(&self, tool_name: &str) -> bool {
        self.state.lock().denied.contains(tool_name)
    }

    /// Forget every remembered answer.
    pub fn clear_session(&self) {
        let mut state = self.state.lock();
        state.session_allowed.clear();
        state.denied.clear();
        info!("Cleared session tool permissions");
    }

    fn cached(&self, tool_name: &str) -> Option<PermissionDecision> {
        let state = self.state.lock();
        if state.denied.contains(tool_name) {
            Some(PermissionDecision::Denied)
        } else if state.session_allowed.contains(tool_name) {
            Some(PermissionDecision::Allowed)
        } else {
            None
        }
    }

    async fn prompt(&self, tool_name: &str, tab: TabId, request_id: &str) -> Option<PermissionChoice> {
        let message = OutboundMessage::PermissionRequest {
            tool_name: tool_name.to_string(),
            request_id: request_id.to_string(),
        };

        match tokio::time::timeout(self.prompt_timeout, self.bus.send_to_tab(tab, message)).await {
            Ok(Ok(reply)) => Some(PermissionChoice::from_reply(&reply)),
            Ok(Err(e)) => {
                warn!("Permission prompt for {} failed: {}", tool_name, e);
                None
            }
            Err(_) => {
                warn!(
                    "Permission prompt for {} timed out after {:?}",
                    tool_name, self.prompt_timeout
                );
                None
            }
        }
    }
}

#[async_trait]
impl PermissionCheck for PermissionGate {
    async fn check(
        &self,
        tool_name: &str,
        tab: Option<TabId>,
        request_id: &str,
    ) -> PermissionDecision {
        if self.exempt.contains(tool_name) {
            return PermissionDecision::Allowed;
        }

        if let Some(decision) = self.cached(tool_name) {
            debug!("Using remembered permission for {}: {:?}", tool_name, decision);
            return decision;
        }

        let Some(tab) = tab else {
            warn!("No tab to ask for {} permission, denying", tool_name);
            return PermissionDecision::Denied;
        };

        // An unanswered prompt denies this call only so the user is asked again.
        let Some(choice) = self.prompt(tool_name, tab, request_id).await else {
            return PermissionDecision::Denied;
        };

        info!("Permission for {}: {}", tool_name, choice.as_str());
        let mut state = self.state.lock();
        match choice {
            PermissionChoice::AllowOnce => PermissionDecision::Allowed,
            PermissionChoice::AllowSession => {
                state.session_allowed.insert(tool_name.to_string());
                PermissionDecision::Allowed
            }
            PermissionChoice::Deny => {
                state.denied.insert(tool_name.to_string());
                PermissionDecision::Denied
            }
        }
    }
}

#[cfg(test)]
#[path = "permission_tests.rs"]
mod tests;
