//! Background service.
//!
//! Owns the wiring between storage, the permission gate, the execution
//! tracker, the tool executor and the model provider, and answers every
//! request arriving on the host bus.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use buddy_config::Config;
use buddy_protocols::bus::{ExecuteTaskData, SendMessageData, failure_response, success_response};
use buddy_protocols::{
    BrowserTool, BusEnvelope, BusError, BusRequest, ChatMessage, ChatMessageKind, Conversation,
    ExecutionKind, ExecutionState, HostBus, LLMProvider, Message, OrchestratorError,
    OutboundMessage, ProviderError, ProviderFactory, TabController, TabId, ToolCall,
    generate_id, now_millis,
};
use buddy_storage::{StorageError, StorageManager, is_domain_blacklisted};

use crate::execution::ExecutionTracker;
use crate::executor::{BrowserToolExecutor, ToolExecutor};
use crate::orchestrator::{
    Orchestrator, OrchestratorSettings, ToolCallObserver, TurnOutcome, TurnRequest,
};
use crate::permission::PermissionGate;

/// Page opened by `OPEN_MANAGEMENT`.
pub const MANAGEMENT_PAGE: &str = "src/management/management.html";

const CHAT_TITLE: &str = "Chat";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Task not found")]
    TaskNotFound,

    #[error("No tab available for {0}")]
    NoTab(&'static str),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result of a task execution or chat message.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub result: String,
    pub conversation_id: String,
    pub tool_calls: Vec<ToolCall>,
}

/// What happened when a tab finished loading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabLoadOutcome {
    pub blacklisted: bool,
    /// A click navigated away while the sidebar was open.
    pub reopen_sidebar: bool,
    pub restored: Option<ExecutionState>,
}

pub struct BackgroundService {
    config: Config,
    storage: Arc<StorageManager>,
    bus: Arc<dyn HostBus>,
    tabs: Arc<dyn TabController>,
    providers: Arc<dyn ProviderFactory>,
    gate: Arc<PermissionGate>,
    tracker: Arc<ExecutionTracker>,
    executor: Arc<dyn ToolExecutor>,
    /// Provider built for the current credential.
    provider: Mutex<Option<(String, Arc<dyn LLMProvider>)>>,
}

impl BackgroundService {
    pub fn new(
        config: Config,
        storage: Arc<StorageManager>,
        bus: Arc<dyn HostBus>,
        tabs: Arc<dyn TabController>,
        providers: Arc<dyn ProviderFactory>,
    ) -> Self {
        let gate = Arc::new(PermissionGate::from_config(bus.clone(), &config.permissions));
        let tracker = Arc::new(ExecutionTracker::from_config(
            storage.clone(),
            bus.clone(),
            &config.execution,
        ));
        let executor = Arc::new(
            BrowserToolExecutor::from_config(bus.clone(), tabs.clone(), &config.executor, &config.bus)
                .with_storage(storage.clone()),
        );

        Self {
            config,
            storage,
            bus,
            tabs,
            providers,
            gate,
            tracker,
            executor,
            provider: Mutex::new(None),
        }
    }

    pub fn with_executor(mut self, executor: Arc<dyn ToolExecutor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_tracker(mut self, tracker: Arc<ExecutionTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn gate(&self) -> &Arc<PermissionGate> {
        &self.gate
    }

    pub fn tracker(&self) -> &Arc<ExecutionTracker> {
        &self.tracker
    }

    pub fn storage(&self) -> &Arc<StorageManager> {
        &self.storage
    }

    /// Answer one bus message. Failures become `{ success: false, error }`.
    pub async fn handle(&self, envelope: &BusEnvelope, sender_tab: Option<TabId>) -> Value {
        let request = match BusRequest::parse(envelope) {
            Ok(request) => request,
            Err(e) => {
                warn!("Rejected bus message: {}", e);
                return failure_response(e);
            }
        };

        let kind = request.message_type();
        debug!("Handling {} from tab {:?}", kind, sender_tab);
        match self.dispatch(request, sender_tab).await {
            Ok(response) => response,
            Err(e) => {
                error!("{} failed: {}", kind, e);
                failure_response(e)
            }
        }
    }

    async fn dispatch(
        &self,
        request: BusRequest,
        sender_tab: Option<TabId>,
    ) -> Result<Value, ServiceError> {
        match request {
            BusRequest::ExecuteTask(data) => {
                let requested = data.conversation_id.clone();
                Ok(reply_response(self.execute_task(data, sender_tab).await, requested))
            }
            BusRequest::SendMessage(data) => {
                let requested = data.conversation_id.clone();
                Ok(reply_response(self.send_message(data, sender_tab).await, requested))
            }
            BusRequest::UpdateApiKey { api_key } => {
                self.update_api_key(&api_key).await?;
                Ok(success_response())
            }
            BusRequest::GetApiKey => {
                let api_key = self.storage.get_api_key().await?;
                Ok(json!({ "success": true, "apiKey": api_key }))
            }
            BusRequest::ClearApiKey => {
                self.clear_api_key().await?;
                Ok(success_response())
            }
            BusRequest::TestApiKey { api_key } => {
                self.test_api_key(&api_key).await?;
                Ok(json!({ "success": true, "valid": true }))
            }
            BusRequest::GetConversations => {
                Ok(serde_json::to_value(self.storage.get_conversations().await?)?)
            }
            BusRequest::DeleteConversation { conversation_id } => {
                self.storage.delete_conversation(&conversation_id).await?;
                Ok(success_response())
            }
            BusRequest::GetTasks => Ok(serde_json::to_value(self.storage.get_tasks().await?)?),
            BusRequest::SaveTask(task) => {
                self.storage.save_task(&task).await?;
                Ok(success_response())
            }
            BusRequest::DeleteTask { task_id } => {
                self.storage.delete_task(&task_id).await?;
                Ok(success_response())
            }
            BusRequest::GetSettings => Ok(serde_json::to_value(self.storage.get_settings().await?)?),
            BusRequest::UpdateSettings(patch) => {
                let settings = self.storage.update_settings(&patch).await?;
                debug!("Settings updated, model {}", settings.selected_model);
                Ok(success_response())
            }
            BusRequest::GetAvailableModels => {
                let (provider, _) = self.provider().await?;
                let models: Vec<Value> = provider
                    .models()
                    .iter()
                    .map(|m| json!({ "id": m.id, "name": m.name }))
                    .collect();
                Ok(json!({ "success": true, "models": models }))
            }
            BusRequest::OpenManagement => {
                self.tabs.open_tab(MANAGEMENT_PAGE).await?;
                Ok(success_response())
            }
            BusRequest::CaptureVisibleTab => {
                let tab = sender_tab.ok_or(ServiceError::NoTab("CAPTURE_VISIBLE_TAB"))?;
                match self.tabs.capture_visible_tab(tab).await {
                    Ok(data_url) => Ok(json!({ "dataUrl": data_url })),
                    Err(e) => Ok(json!({ "error": e.to_string() })),
                }
            }
        }
    }

    /// Run a canned task over page or selection content.
    pub async fn execute_task(
        &self,
        data: ExecuteTaskData,
        sender_tab: Option<TabId>,
    ) -> Result<ChatReply, ServiceError> {
        let (provider, model) = self.provider().await?;
        let task = self
            .storage
            .get_task(&data.task_id)
            .await?
            .ok_or(ServiceError::TaskNotFound)?;
        info!("Executing task {}", task.id);

        let mut conversation = self
            .load_conversation(data.conversation_id.as_deref(), &task.name)
            .await?;
        let mut messages = history_messages(&conversation, self.config.orchestrator.history_window);
        messages.push(Message::user(task.render_prompt(&data.content)));

        let turn = TurnRequest {
            request_id: data.request_id.unwrap_or_else(generate_id),
            messages,
            tools: Vec::new(),
            tab: sender_tab,
        };
        let outcome = self
            .run_tracked(ExecutionKind::Task, &conversation.id, turn, provider, model)
            .await?;

        conversation.push(ChatMessage::task(&task.id, format!("Executing: {}", task.name)));
        conversation.push(ChatMessage::assistant(&outcome.text));
        self.finish_conversation(&conversation).await?;

        Ok(ChatReply {
            result: outcome.text,
            conversation_id: conversation.id,
            tool_calls: outcome.tool_calls,
        })
    }

    /// Free-form chat with the browser tools available.
    pub async fn send_message(
        &self,
        data: SendMessageData,
        sender_tab: Option<TabId>,
    ) -> Result<ChatReply, ServiceError> {
        let (provider, model) = self.provider().await?;
        let settings = self.storage.get_settings().await?;

        let mut conversation = self
            .load_conversation(data.conversation_id.as_deref(), CHAT_TITLE)
            .await?;

        let content = if conversation.messages.is_empty() {
            let page_context = match sender_tab {
                Some(tab) => self.page_context(tab).await,
                None => String::new(),
            };
            format!("{}{}", data.message, page_context)
        } else {
            data.message.clone()
        };
        conversation.push(ChatMessage::user(content));

        let turn = TurnRequest {
            request_id: data.request_id.unwrap_or_else(generate_id),
            messages: history_messages(&conversation, self.config.orchestrator.history_window),
            tools: BrowserTool::all_definitions(),
            tab: sender_tab,
        };
        let outcome = self
            .run_tracked(ExecutionKind::Message, &conversation.id, turn, provider, model)
            .await?;

        let show_debug = data
            .show_debug_messages
            .unwrap_or(settings.show_debug_messages);
        if show_debug && !outcome.tool_calls.is_empty() {
            conversation.push(ChatMessage::debug(debug_report(&outcome.tool_calls)?));
        }
        conversation.push(ChatMessage::assistant(&outcome.text));
        self.finish_conversation(&conversation).await?;

        Ok(ChatReply {
            result: outcome.text,
            conversation_id: conversation.id,
            tool_calls: outcome.tool_calls,
        })
    }

    /// A tab finished loading `url`.
    pub async fn on_tab_complete(&self, tab: TabId, url: &str) -> Result<TabLoadOutcome, ServiceError> {
        let blacklist = self.storage.get_blacklist().await?;
        let blacklisted = is_domain_blacklisted(url, &blacklist);
        if blacklisted {
            info!("Tab {} is on a blacklisted site: {}", tab, url);
            let notice = OutboundMessage::SiteBlacklisted {
                url: url.to_string(),
            };
            // The page scripts may not be listening yet.
            if let Err(e) = self.bus.send_to_tab(tab, notice).await {
                debug!("Blacklist notice to tab {} not delivered: {}", tab, e);
            }
        }

        let reopen_sidebar = match self.storage.get_navigation_state().await? {
            Some(marker) if marker.pending => {
                self.storage.set_navigation_state(None).await?;
                marker.reopen_sidebar
            }
            _ => false,
        };

        let restored = self.tracker.handle_tab_complete(tab).await?;

        Ok(TabLoadOutcome {
            blacklisted,
            reopen_sidebar,
            restored,
        })
    }

    /// In-flight work a freshly opened UI should show.
    pub async fn check_pending_execution(&self) -> Result<Option<ExecutionState>, ServiceError> {
        Ok(self.tracker.check_pending_on_load(now_millis()).await?)
    }

    async fn update_api_key(&self, api_key: &str) -> Result<(), ServiceError> {
        self.storage.save_api_key(api_key.trim()).await?;
        self.reset_credentials();
        info!("API key updated");
        Ok(())
    }

    async fn clear_api_key(&self) -> Result<(), ServiceError> {
        self.storage.clear_api_key().await?;
        self.reset_credentials();
        info!("API key cleared");
        Ok(())
    }

    fn reset_credentials(&self) {
        *self.provider.lock() = None;
        self.gate.clear_session();
    }

    async fn test_api_key(&self, api_key: &str) -> Result<(), ServiceError> {
        let model = self.selected_model().await?;
        self.providers
            .create(api_key.trim())
            .validate_credentials(&model)
            .await?;
        Ok(())
    }

    async fn selected_model(&self) -> Result<String, ServiceError> {
        let settings = self.storage.get_settings().await?;
        Ok(if settings.selected_model.is_empty() {
            self.config.anthropic.model.clone()
        } else {
            settings.selected_model
        })
    }

    /// Provider for the configured credential and the selected model.
    async fn provider(&self) -> Result<(Arc<dyn LLMProvider>, String), ServiceError> {
        let api_key = match self.config.anthropic.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Some(key.to_string()),
            _ => self.storage.get_api_key().await?,
        };
        let api_key = api_key.ok_or(OrchestratorError::NotConfigured)?;
        let model = self.selected_model().await?;

        let mut cached = self.provider.lock();
        let provider = match cached.as_ref() {
            Some((key, provider)) if *key == api_key => provider.clone(),
            _ => {
                let provider = self.providers.create(&api_key);
                *cached = Some((api_key, provider.clone()));
                provider
            }
        };
        Ok((provider, model))
    }

    async fn run_tracked(
        &self,
        kind: ExecutionKind,
        conversation_id: &str,
        turn: TurnRequest,
        provider: Arc<dyn LLMProvider>,
        model: String,
    ) -> Result<TurnOutcome, ServiceError> {
        let request_id = turn.request_id.clone();
        if let Err(e) = self
            .tracker
            .start(&request_id, conversation_id, kind, turn.tab)
            .await
        {
            warn!("Failed to persist execution state {}: {}", request_id, e);
        }

        let observer = Arc::new(TrackingObserver {
            bus: self.bus.clone(),
            tracker: self.tracker.clone(),
        });
        let orchestrator = Orchestrator::new(
            provider,
            self.executor.clone(),
            self.gate.clone(),
            OrchestratorSettings::from_config(&self.config, model),
        )
        .with_observer(observer);

        let outcome = orchestrator.run(turn).await;

        if let Err(e) = self.tracker.complete(&request_id).await {
            warn!("Failed to clear execution state {}: {}", request_id, e);
        }
        Ok(outcome?)
    }

    async fn load_conversation(
        &self,
        id: Option<&str>,
        title: &str,
    ) -> Result<Conversation, ServiceError> {
        if let Some(id) = id {
            if let Some(conversation) = self.storage.get_conversation(id).await? {
                return Ok(conversation);
            }
            debug!("Conversation {} not found, starting a new one", id);
        }
        Ok(Conversation::new(title))
    }

    async fn finish_conversation(&self, conversation: &Conversation) -> Result<(), ServiceError> {
        self.storage.save_conversation(conversation).await?;
        self.storage
            .set_current_conversation_id(Some(&conversation.id))
            .await?;
        Ok(())
    }

    async fn page_context(&self, tab: TabId) -> String {
        match self.tabs.tab_info(tab).await {
            Ok(info) if !info.url.is_empty() && !info.url.starts_with("chrome://") => {
                let title = if info.title.is_empty() {
                    "Untitled"
                } else {
                    info.title.as_str()
                };
                format!("\n\n[Current page: {} - {}]", title, info.url)
            }
            Ok(_) => String::new(),
            Err(e) => {
                warn!("Failed to get info for tab {}: {}", tab, e);
                String::new()
            }
        }
    }
}

/// Broadcasts each tool call and records it in the execution log.
struct TrackingObserver {
    bus: Arc<dyn HostBus>,
    tracker: Arc<ExecutionTracker>,
}

#[async_trait]
impl ToolCallObserver for TrackingObserver {
    async fn on_tool_call(&self, request_id: &str, call: &ToolCall) {
        let update = OutboundMessage::ToolCallUpdate {
            request_id: request_id.to_string(),
            tool_call: call.clone(),
        };
        if let Err(e) = self.bus.broadcast(update).await {
            debug!("Tool call update not delivered: {}", e);
        }
        if let Err(e) = self.tracker.record_tool_call(request_id, call).await {
            warn!("Failed to record tool call {}: {}", call.name, e);
        }
    }
}

/// Replay the recent non-task messages as model turns.
fn history_messages(conversation: &Conversation, window: usize) -> Vec<Message> {
    conversation
        .history(window)
        .into_iter()
        .map(|message| match message.kind {
            ChatMessageKind::User => Message::user(&message.content),
            _ => Message::assistant(&message.content),
        })
        .collect()
}

fn debug_report(calls: &[ToolCall]) -> Result<String, serde_json::Error> {
    let summary: Vec<Value> = calls
        .iter()
        .map(|call| json!({ "name": call.name, "input": call.input }))
        .collect();
    Ok(format!(
        "Tool calls made:\n{}",
        serde_json::to_string_pretty(&summary)?
    ))
}

fn reply_response(result: Result<ChatReply, ServiceError>, requested: Option<String>) -> Value {
    match result {
        Ok(reply) => json!({
            "success": true,
            "result": reply.result,
            "conversationId": reply.conversation_id,
        }),
        Err(e) => {
            error!("Request failed: {}", e);
            json!({
                "success": false,
                "error": e.to_string(),
                "conversationId": requested.unwrap_or_else(generate_id),
            })
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
