//! Execution state tracking.
//!
//! Every running request lives in an in-memory arena keyed by request id.
//! The most recently started one is also written to a single persisted slot
//! so a freshly loaded page can tell the user that work is still in flight.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use buddy_config::ExecutionConfig;
use buddy_protocols::{
    ExecutionKind, ExecutionState, HostBus, Millis, OutboundMessage, TabId, ToolCall,
    ToolCallRecord, now_millis,
};
use buddy_storage::{StorageError, StorageManager};

pub struct ExecutionTracker {
    active: DashMap<String, ExecutionState>,
    /// Held across every read-modify-write of the persisted slot.
    slot: Mutex<()>,
    storage: Arc<StorageManager>,
    bus: Arc<dyn HostBus>,
    stale_after: Duration,
    restore_delay: Duration,
}

impl ExecutionTracker {
    pub fn new(storage: Arc<StorageManager>, bus: Arc<dyn HostBus>) -> Self {
        Self::from_config(storage, bus, &ExecutionConfig::default())
    }

    pub fn from_config(
        storage: Arc<StorageManager>,
        bus: Arc<dyn HostBus>,
        config: &ExecutionConfig,
    ) -> Self {
        Self {
            active: DashMap::new(),
            slot: Mutex::new(()),
            storage,
            bus,
            stale_after: Duration::from_secs(config.stale_after_secs),
            restore_delay: Duration::from_millis(config.restore_delay_ms),
        }
    }

    pub fn with_restore_delay(mut self, delay: Duration) -> Self {
        self.restore_delay = delay;
        self
    }

    /// Requests currently running in this process.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn get(&self, request_id: &str) -> Option<ExecutionState> {
        self.active.get(request_id).map(|entry| entry.clone())
    }

    pub async fn start(
        &self,
        request_id: &str,
        conversation_id: &str,
        kind: ExecutionKind,
        tab: Option<TabId>,
    ) -> Result<ExecutionState, StorageError> {
        let state = ExecutionState::new(request_id, conversation_id, kind, tab, now_millis());
        self.active.insert(request_id.to_string(), state.clone());
        debug!("Started execution {} for conversation {}", request_id, conversation_id);

        let _slot = self.slot.lock().await;
        self.storage.set_execution_state(Some(&state)).await?;
        Ok(state)
    }

    /// Append a tool call to the log. Unknown request ids are ignored.
    pub async fn record_tool_call(&self, request_id: &str, call: &ToolCall) -> Result<(), StorageError> {
        let snapshot = {
            let Some(mut entry) = self.active.get_mut(request_id) else {
                return Ok(());
            };
            let now = now_millis();
            entry.tool_calls.push(ToolCallRecord {
                name: call.name.clone(),
                input: call.input.clone(),
                timestamp: now,
            });
            entry.last_activity = now;
            entry.clone()
        };

        let _slot = self.slot.lock().await;
        self.storage.set_execution_state(Some(&snapshot)).await
    }

    /// Forget a finished request. The persisted slot is cleared only while it
    /// still describes this request.
    pub async fn complete(&self, request_id: &str) -> Result<(), StorageError> {
        self.active.remove(request_id);

        let _slot = self.slot.lock().await;
        let holds_request = self
            .storage
            .get_execution_state()
            .await?
            .is_some_and(|state| state.request_id == request_id);
        if holds_request {
            self.storage.set_execution_state(None).await?;
        }
        debug!("Completed execution {}", request_id);
        Ok(())
    }

    /// The persisted state if it still describes live work at `now`.
    /// Abandoned or finished states are cleared.
    pub async fn check_pending_on_load(&self, now: Millis) -> Result<Option<ExecutionState>, StorageError> {
        let _slot = self.slot.lock().await;
        self.pending_at(now).await
    }

    async fn pending_at(&self, now: Millis) -> Result<Option<ExecutionState>, StorageError> {
        let Some(state) = self.storage.get_execution_state().await? else {
            return Ok(None);
        };

        if state.is_pending(now, self.stale_after.as_millis() as i64) {
            return Ok(Some(state));
        }

        info!("Clearing stale execution state {}", state.request_id);
        self.storage.set_execution_state(None).await?;
        Ok(None)
    }

    /// A tab finished loading: point any pending state at it and, after the
    /// restore delay, tell the tab about it.
    pub async fn handle_tab_complete(&self, tab: TabId) -> Result<Option<ExecutionState>, StorageError> {
        let slot = self.slot.lock().await;
        let Some(mut state) = self.pending_at(now_millis()).await? else {
            return Ok(None);
        };

        state.tab_id = Some(tab);
        self.storage.set_execution_state(Some(&state)).await?;
        drop(slot);
        if let Some(mut entry) = self.active.get_mut(&state.request_id) {
            entry.tab_id = Some(tab);
        }

        let bus = self.bus.clone();
        let delay = self.restore_delay;
        let restored = state.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let request_id = restored.request_id.clone();
            if let Err(e) = bus
                .send_to_tab(tab, OutboundMessage::RestoreExecutionState(restored))
                .await
            {
                warn!("Failed to restore execution {} in tab {}: {}", request_id, tab, e);
            }
        });

        Ok(Some(state))
    }
}

#[cfg(test)]
#[path = "execution_tests.rs"]
mod tests;
