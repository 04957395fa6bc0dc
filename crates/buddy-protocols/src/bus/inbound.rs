//! Requests the background service accepts.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::BusEnvelope;
use crate::error::BusError;
use crate::records::Task;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteTaskData {
    pub task_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageData {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub show_debug_messages: Option<bool>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiKeyData {
    api_key: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversationIdData {
    conversation_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskIdData {
    task_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct SaveTaskData {
    task: Task,
}

/// A parsed inbound bus request.
#[derive(Debug, Clone, PartialEq)]
pub enum BusRequest {
    ExecuteTask(ExecuteTaskData),
    SendMessage(SendMessageData),
    UpdateApiKey { api_key: String },
    GetApiKey,
    ClearApiKey,
    TestApiKey { api_key: String },
    GetConversations,
    DeleteConversation { conversation_id: String },
    GetTasks,
    SaveTask(Box<Task>),
    DeleteTask { task_id: String },
    GetSettings,
    /// Partial settings object, merged into the stored settings.
    UpdateSettings(Value),
    GetAvailableModels,
    OpenManagement,
    CaptureVisibleTab,
}

impl BusRequest {
    pub fn parse(envelope: &BusEnvelope) -> Result<Self, BusError> {
        let kind = envelope.message_type.as_str();
        let request = match kind {
            "EXECUTE_TASK" => BusRequest::ExecuteTask(payload(envelope)?),
            "SEND_MESSAGE" => BusRequest::SendMessage(payload(envelope)?),
            "UPDATE_API_KEY" => {
                let data: ApiKeyData = payload(envelope)?;
                BusRequest::UpdateApiKey {
                    api_key: data.api_key,
                }
            }
            "GET_API_KEY" => BusRequest::GetApiKey,
            "CLEAR_API_KEY" => BusRequest::ClearApiKey,
            "TEST_API_KEY" => {
                let data: ApiKeyData = payload(envelope)?;
                BusRequest::TestApiKey {
                    api_key: data.api_key,
                }
            }
            "GET_CONVERSATIONS" => BusRequest::GetConversations,
            "DELETE_CONVERSATION" => {
                let data: ConversationIdData = payload(envelope)?;
                BusRequest::DeleteConversation {
                    conversation_id: data.conversation_id,
                }
            }
            "GET_TASKS" => BusRequest::GetTasks,
            "SAVE_TASK" => {
                let data: SaveTaskData = payload(envelope)?;
                BusRequest::SaveTask(Box::new(data.task))
            }
            "DELETE_TASK" => {
                let data: TaskIdData = payload(envelope)?;
                BusRequest::DeleteTask {
                    task_id: data.task_id,
                }
            }
            "GET_SETTINGS" => BusRequest::GetSettings,
            "UPDATE_SETTINGS" => {
                if !envelope.data.is_object() {
                    return Err(BusError::InvalidPayload {
                        message_type: kind.to_string(),
                        reason: "expected an object".to_string(),
                    });
                }
                BusRequest::UpdateSettings(envelope.data.clone())
            }
            "GET_AVAILABLE_MODELS" => BusRequest::GetAvailableModels,
            "OPEN_MANAGEMENT" => BusRequest::OpenManagement,
            "CAPTURE_VISIBLE_TAB" => BusRequest::CaptureVisibleTab,
            other => return Err(BusError::UnknownMessageType(other.to_string())),
        };
        Ok(request)
    }

    /// Wire name of the request.
    pub fn message_type(&self) -> &'static str {
        match self {
            BusRequest::ExecuteTask(_) => "EXECUTE_TASK",
            BusRequest::SendMessage(_) => "SEND_MESSAGE",
            BusRequest::UpdateApiKey { .. } => "UPDATE_API_KEY",
            BusRequest::GetApiKey => "GET_API_KEY",
            BusRequest::ClearApiKey => "CLEAR_API_KEY",
            BusRequest::TestApiKey { .. } => "TEST_API_KEY",
            BusRequest::GetConversations => "GET_CONVERSATIONS",
            BusRequest::DeleteConversation { .. } => "DELETE_CONVERSATION",
            BusRequest::GetTasks => "GET_TASKS",
            BusRequest::SaveTask(_) => "SAVE_TASK",
            BusRequest::DeleteTask { .. } => "DELETE_TASK",
            BusRequest::GetSettings => "GET_SETTINGS",
            BusRequest::UpdateSettings(_) => "UPDATE_SETTINGS",
            BusRequest::GetAvailableModels => "GET_AVAILABLE_MODELS",
            BusRequest::OpenManagement => "OPEN_MANAGEMENT",
            BusRequest::CaptureVisibleTab => "CAPTURE_VISIBLE_TAB",
        }
    }
}

fn payload<T: DeserializeOwned>(envelope: &BusEnvelope) -> Result<T, BusError> {
    serde_json::from_value(envelope.data.clone()).map_err(|e| BusError::InvalidPayload {
        message_type: envelope.message_type.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "inbound_tests.rs"]
mod tests;
