//! Hand-written doubles shared by the runtime tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use buddy_protocols::{
    BusError, CompletionRequest, CompletionResponse, ContentPart, HostBus, LLMProvider,
    ModelDefinition, OutboundMessage, ProviderError, ProviderFactory, StopReason, TabController,
    TabId, TabInfo, Usage,
};

type Responder = Box<dyn Fn(TabId, &OutboundMessage) -> Result<Value, BusError> + Send + Sync>;

/// Bus that records traffic and answers with a closure.
pub struct MockBus {
    sent: Mutex<Vec<(TabId, OutboundMessage)>>,
    broadcasts: Mutex<Vec<OutboundMessage>>,
    responder: Responder,
    delay: Option<Duration>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::replying(|_, _| Ok(Value::Null))
    }

    pub fn replying(
        responder: impl Fn(TabId, &OutboundMessage) -> Result<Value, BusError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            broadcasts: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            delay: None,
        }
    }

    /// Answers permission prompts with `choice` and page actions with success.
    pub fn answering_permission(choice: &'static str) -> Self {
        Self::replying(move |_, message| match message {
            OutboundMessage::PermissionRequest { .. } => Ok(json!({ "permission": choice })),
            _ => Ok(json!({ "success": true })),
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn sent(&self) -> Vec<(TabId, OutboundMessage)> {
        self.sent.lock().clone()
    }

    pub fn prompts(&self) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|(_, m)| matches!(m, OutboundMessage::PermissionRequest { .. }))
            .count()
    }

    pub fn broadcasts(&self) -> Vec<OutboundMessage> {
        self.broadcasts.lock().clone()
    }
}

#[async_trait]
impl HostBus for MockBus {
    async fn send_to_tab(&self, tab: TabId, message: OutboundMessage) -> Result<Value, BusError> {
        self.sent.lock().push((tab, message.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(tab, &message)
    }

    async fn broadcast(&self, message: OutboundMessage) -> Result<(), BusError> {
        self.broadcasts.lock().push(message);
        Ok(())
    }
}

/// Tab controller with a single fixed tab.
pub struct MockTabs {
    pub info: TabInfo,
    pub screenshot: String,
    at_history_start: bool,
    navigations: Mutex<Vec<String>>,
    opened: Mutex<Vec<String>>,
}

impl MockTabs {
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            info: TabInfo {
                id: 1,
                url: url.to_string(),
                title: title.to_string(),
            },
            screenshot: "data:image/png;base64,AAAA".to_string(),
            at_history_start: false,
            navigations: Mutex::new(Vec::new()),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// A tab with nothing to go back to.
    pub fn at_history_start(mut self) -> Self {
        self.at_history_start = true;
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

#[async_trait]
impl TabController for MockTabs {
    async fn tab_info(&self, tab: TabId) -> Result<TabInfo, BusError> {
        Ok(TabInfo {
            id: tab,
            ..self.info.clone()
        })
    }

    async fn go_back(&self, _tab: TabId) -> Result<(), BusError> {
        if self.at_history_start {
            return Err(BusError::DeliveryFailed("no previous page in history".to_string()));
        }
        self.navigations.lock().push("back".to_string());
        Ok(())
    }

    async fn go_forward(&self, _tab: TabId) -> Result<(), BusError> {
        self.navigations.lock().push("forward".to_string());
        Ok(())
    }

    async fn navigate(&self, _tab: TabId, url: &str) -> Result<(), BusError> {
        self.navigations.lock().push(url.to_string());
        Ok(())
    }

    async fn capture_visible_tab(&self, _tab: TabId) -> Result<String, BusError> {
        Ok(self.screenshot.clone())
    }

    async fn open_tab(&self, url: &str) -> Result<TabId, BusError> {
        self.opened.lock().push(url.to_string());
        Ok(99)
    }
}

pub fn text_response(text: &str) -> CompletionResponse {
    CompletionResponse {
        id: "msg_text".to_string(),
        model: "mock-model".to_string(),
        content: vec![ContentPart::Text {
            text: text.to_string(),
        }],
        stop_reason: StopReason::EndTurn,
        usage: Usage::default(),
    }
}

pub fn tool_response(calls: &[(&str, &str, Value)]) -> CompletionResponse {
    CompletionResponse {
        id: "msg_tools".to_string(),
        model: "mock-model".to_string(),
        content: calls
            .iter()
            .map(|(id, name, input)| ContentPart::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input: input.clone(),
            })
            .collect(),
        stop_reason: StopReason::ToolUse,
        usage: Usage::default(),
    }
}

/// Provider that replays scripted responses and records requests.
pub struct MockProvider {
    models: Vec<ModelDefinition>,
    responses: Mutex<VecDeque<Result<CompletionResponse, ProviderError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
}

impl MockProvider {
    pub fn new(responses: Vec<Result<CompletionResponse, ProviderError>>) -> Self {
        Self {
            models: vec![ModelDefinition::new("mock-model", "Mock Model")],
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LLMProvider for MockProvider {
    fn id(&self) -> &str {
        "mock"
    }

    fn models(&self) -> &[ModelDefinition] {
        &self.models
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        self.requests.lock().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(text_response("done")))
    }
}

/// Factory that always hands out the same provider.
pub struct MockProviderFactory {
    pub provider: Arc<MockProvider>,
    created: AtomicU32,
    keys: Mutex<Vec<String>>,
}

impl MockProviderFactory {
    pub fn new(provider: Arc<MockProvider>) -> Self {
        Self {
            provider,
            created: AtomicU32::new(0),
            keys: Mutex::new(Vec::new()),
        }
    }

    pub fn created(&self) -> u32 {
        self.created.load(Ordering::SeqCst)
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().clone()
    }
}

impl ProviderFactory for MockProviderFactory {
    fn create(&self, api_key: &str) -> Arc<dyn LLMProvider> {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.keys.lock().push(api_key.to_string());
        self.provider.clone()
    }
}
