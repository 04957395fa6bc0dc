//! Conversation records.

use serde::{Deserialize, Serialize};

use crate::types::{Millis, generate_id, now_millis};

/// Kind of entry in a conversation transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageKind {
    User,
    Assistant,
    Task,
    Debug,
    Tool,
}

/// One entry in a conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: ChatMessageKind,

    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_output: Option<String>,

    pub timestamp: Millis,
}

impl ChatMessage {
    pub fn new(kind: ChatMessageKind, content: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            kind,
            content: content.into(),
            task_id: None,
            task_output: None,
            timestamp: now_millis(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatMessageKind::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatMessageKind::Assistant, content)
    }

    pub fn debug(content: impl Into<String>) -> Self {
        Self::new(ChatMessageKind::Debug, content)
    }

    /// Marker entry for a task run.
    pub fn task(task_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut message = Self::new(ChatMessageKind::Task, content);
        message.task_id = Some(task_id.into());
        message
    }

    pub fn with_task_output(mut self, output: impl Into<String>) -> Self {
        self.task_output = Some(output.into());
        self
    }
}

/// A durable task or chat thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub created_at: Millis,
    pub updated_at: Millis,
}

impl Conversation {
    pub fn new(title: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: generate_id(),
            title: title.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and bump `updated_at`.
    pub fn push(&mut self, message: ChatMessage) {
        self.updated_at = message.timestamp.max(now_millis());
        self.messages.push(message);
    }

    /// The last `window` messages that are not task markers, oldest first.
    pub fn history(&self, window: usize) -> Vec<&ChatMessage> {
        let relevant: Vec<&ChatMessage> = self
            .messages
            .iter()
            .filter(|m| m.kind != ChatMessageKind::Task)
            .collect();
        let skip = relevant.len().saturating_sub(window);
        relevant.into_iter().skip(skip).collect()
    }

    /// Drop everything but the last `keep` messages.
    pub fn truncate_to_last(&mut self, keep: usize) {
        let excess = self.messages.len().saturating_sub(keep);
        if excess > 0 {
            self.messages.drain(..excess);
        }
    }
}
