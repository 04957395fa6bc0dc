//! The tool-calling conversation loop.
//!
//! One [`Orchestrator::run`] call sends the conversation to the model, runs
//! every tool the model asks for (after a permission check), feeds the
//! results back and repeats until the model answers in plain text.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use buddy_config::Config;
use buddy_protocols::{
    CompletionRequest, CompletionResponse, ContentPart, DEFAULT_MODEL, LLMProvider, Message,
    MessageRole, OrchestratorError, TabId, ToolCall, ToolDefinition, ToolError,
};

use crate::executor::ToolExecutor;
use crate::permission::PermissionCheck;

/// Answer used when the model returns no text block.
pub const NO_RESPONSE_TEXT: &str = "No response received";

/// Hook invoked right before a permitted tool runs.
#[async_trait]
pub trait ToolCallObserver: Send + Sync {
    async fn on_tool_call(&self, request_id: &str, call: &ToolCall);
}

/// Model parameters and limits for one orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub model: String,
    pub max_tokens: u32,
    pub system_prompt: Option<String>,
    pub request_timeout: Duration,
    pub max_rounds: u32,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 4000,
            system_prompt: None,
            request_timeout: Duration::from_secs(30),
            max_rounds: 10,
        }
    }
}

impl OrchestratorSettings {
    pub fn from_config(config: &Config, model: impl Into<String>) -> Self {
        let prompt = config.orchestrator.system_prompt.trim();
        Self {
            model: model.into(),
            max_tokens: config.anthropic.max_tokens,
            system_prompt: (!prompt.is_empty()).then(|| prompt.to_string()),
            request_timeout: Duration::from_secs(config.orchestrator.request_timeout_secs),
            max_rounds: config.orchestrator.max_rounds,
        }
    }
}

/// Input to one orchestration cycle.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub request_id: String,
    /// Prior history followed by the new user turn.
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub tab: Option<TabId>,
}

/// Final answer plus every tool call made on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
}

pub struct Orchestrator {
    provider: Arc<dyn LLMProvider>,
    executor: Arc<dyn ToolExecutor>,
    permission: Arc<dyn PermissionCheck>,
    observer: Option<Arc<dyn ToolCallObserver>>,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        executor: Arc<dyn ToolExecutor>,
        permission: Arc<dyn PermissionCheck>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            provider,
            executor,
            permission,
            observer: None,
            settings,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ToolCallObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Run the cycle until the model stops asking for tools.
    pub async fn run(&self, request: TurnRequest) -> Result<TurnOutcome, OrchestratorError> {
        let mut messages = request.messages.clone();
        let mut tool_calls = Vec::new();
        let mut round = 0;

        loop {
            let response = self.complete(&messages, &request.tools).await?;
            let calls = response.tool_calls();

            if calls.is_empty() {
                info!(
                    "Request {} answered after {} tool rounds",
                    request.request_id, round
                );
                let text = response.first_text().unwrap_or(NO_RESPONSE_TEXT).to_string();
                return Ok(TurnOutcome { text, tool_calls });
            }

            if round >= self.settings.max_rounds {
                warn!(
                    "Request {} still requesting tools after {} rounds",
                    request.request_id, round
                );
                return Err(OrchestratorError::MaxRoundsExceeded(round));
            }

            round += 1;
            debug!(
                "Request {} round {}: {} tool calls",
                request.request_id,
                round,
                calls.len()
            );

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                let content = self.run_tool(&request, call).await;
                results.push(ContentPart::tool_result(&call.id, content));
            }

            messages.push(response.to_message());
            messages.push(Message::with_parts(MessageRole::User, results));
            tool_calls.extend(calls);
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<CompletionResponse, OrchestratorError> {
        let mut completion = CompletionRequest::new(&self.settings.model, messages.to_vec())
            .with_max_tokens(self.settings.max_tokens);
        if let Some(system) = &self.settings.system_prompt {
            completion = completion.with_system(system);
        }
        if !tools.is_empty() {
            completion = completion.with_tools(tools.to_vec());
        }

        let timeout = self.settings.request_timeout;
        match tokio::time::timeout(timeout, self.provider.complete(completion)).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!("Model request timed out after {:?}", timeout);
                Err(OrchestratorError::Timeout(timeout.as_secs()))
            }
        }
    }

    /// Runs one tool call and renders its outcome as tool-result text.
    async fn run_tool(&self, request: &TurnRequest, call: &ToolCall) -> String {
        let Some(tab) = request.tab else {
            return format!("Error: {}", ToolError::NoContext);
        };

        let decision = self
            .permission
            .check(&call.name, Some(tab), &request.request_id)
            .await;
        if !decision.is_allowed() {
            info!("Tool {} denied for request {}", call.name, request.request_id);
            return format!("Permission denied for tool: {}", call.name);
        }

        if let Some(observer) = &self.observer {
            observer.on_tool_call(&request.request_id, call).await;
        }

        match self.executor.execute(&call.name, &call.input, Some(tab)).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Tool {} failed: {}", call.name, e);
                format!("Error: {e}")
            }
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
