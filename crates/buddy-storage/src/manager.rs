//! Typed storage operations.

use std::sync::Arc;

use buddy_protocols::{
    Conversation, ExecutionState, NavigationState, Settings, Task, built_in_tasks, now_millis,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::keys;
use crate::store::KeyValueStore;

/// Messages kept when a conversation does not fit the item quota.
const QUOTA_FALLBACK_MESSAGES: usize = 10;

/// Typed access to everything Buddy persists.
pub struct StorageManager {
    store: Arc<dyn KeyValueStore>,
    max_messages_per_conversation: usize,
}

impl StorageManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            max_messages_per_conversation: 30,
        }
    }

    pub fn with_max_messages_per_conversation(mut self, max: usize) -> Self {
        self.max_messages_per_conversation = max;
        self
    }

    /// Create a manager and run pending migrations.
    pub async fn open(store: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let manager = Self::new(store);
        manager.migrate_legacy_conversations().await?;
        Ok(manager)
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.store.get(key).await? {
            Some(Value::Null) | None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value)?;
        self.store.set(key, &value).await
    }

    /// Move conversations stored under the single legacy key into
    /// per-conversation keys. Returns how many were moved.
    pub async fn migrate_legacy_conversations(&self) -> Result<usize, StorageError> {
        let Some(Value::Array(legacy)) = self.store.get(keys::LEGACY_CONVERSATIONS).await? else {
            return Ok(0);
        };

        info!("Migrating {} conversations to per-conversation keys", legacy.len());

        let mut migrated = 0;
        for value in legacy {
            match serde_json::from_value::<Conversation>(value) {
                Ok(conversation) => {
                    self.write(&keys::conversation_key(&conversation.id), &conversation)
                        .await?;
                    migrated += 1;
                }
                Err(e) => warn!("Skipping unreadable legacy conversation: {}", e),
            }
        }

        self.store.remove(keys::LEGACY_CONVERSATIONS).await?;
        Ok(migrated)
    }

    // Settings

    /// Stored settings, or defaults when none are stored.
    pub async fn get_settings(&self) -> Result<Settings, StorageError> {
        Ok(self.read(keys::SETTINGS).await?.unwrap_or_default())
    }

    /// Merge a partial settings object into the stored settings.
    pub async fn update_settings(&self, patch: &Value) -> Result<Settings, StorageError> {
        let updated = self.get_settings().await?.merged(patch)?;
        self.write(keys::SETTINGS, &updated).await?;
        Ok(updated)
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        self.write(keys::SETTINGS, settings).await
    }

    // API key

    pub async fn get_api_key(&self) -> Result<Option<String>, StorageError> {
        let key: Option<String> = self.read(keys::API_KEY).await?;
        Ok(key.filter(|k| !k.is_empty()))
    }

    pub async fn save_api_key(&self, api_key: &str) -> Result<(), StorageError> {
        self.write(keys::API_KEY, &api_key).await
    }

    pub async fn clear_api_key(&self) -> Result<(), StorageError> {
        self.store.remove(keys::API_KEY).await
    }

    // Conversations

    /// All conversations, most recently updated first.
    pub async fn get_conversations(&self) -> Result<Vec<Conversation>, StorageError> {
        let mut conversations = Vec::new();
        for key in self.store.keys().await? {
            if !keys::is_conversation_key(&key) {
                continue;
            }
            match self.read::<Conversation>(&key).await {
                Ok(Some(conversation)) => conversations.push(conversation),
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable conversation {}: {}", key, e),
            }
        }
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    pub async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, StorageError> {
        self.read(&keys::conversation_key(id)).await
    }

    /// Save a conversation, trimming old messages to stay within limits,
    /// then evict conversations beyond the retention setting.
    pub async fn save_conversation(&self, conversation: &Conversation) -> Result<(), StorageError> {
        let key = keys::conversation_key(&conversation.id);

        let mut limited = conversation.clone();
        limited.truncate_to_last(self.max_messages_per_conversation);

        match self.write(&key, &limited).await {
            Ok(()) => {}
            Err(StorageError::QuotaExceeded { size, limit, .. }) => {
                warn!(
                    "Conversation {} is {} bytes (limit {}), keeping last {} messages",
                    conversation.id, size, limit, QUOTA_FALLBACK_MESSAGES
                );
                limited.truncate_to_last(QUOTA_FALLBACK_MESSAGES);
                self.write(&key, &limited).await?;
            }
            Err(e) => return Err(e),
        }

        self.cleanup_old_conversations().await
    }

    /// Delete a conversation, clearing the current pointer if it pointed there.
    pub async fn delete_conversation(&self, id: &str) -> Result<(), StorageError> {
        self.store.remove(&keys::conversation_key(id)).await?;

        if self.get_current_conversation_id().await?.as_deref() == Some(id) {
            self.set_current_conversation_id(None).await?;
        }
        Ok(())
    }

    async fn cleanup_old_conversations(&self) -> Result<(), StorageError> {
        let retention = self.get_settings().await?.conversation_retention;
        let conversations = self.get_conversations().await?;

        if conversations.len() > retention {
            for conversation in &conversations[retention..] {
                debug!("Evicting conversation {}", conversation.id);
                self.delete_conversation(&conversation.id).await?;
            }
        }
        Ok(())
    }

    pub async fn get_current_conversation_id(&self) -> Result<Option<String>, StorageError> {
        self.read(keys::CURRENT_CONVERSATION).await
    }

    pub async fn set_current_conversation_id(&self, id: Option<&str>) -> Result<(), StorageError> {
        match id {
            Some(id) => self.write(keys::CURRENT_CONVERSATION, &id).await,
            None => self.store.remove(keys::CURRENT_CONVERSATION).await,
        }
    }

    // Tasks

    /// Built-in tasks followed by custom tasks.
    pub async fn get_tasks(&self) -> Result<Vec<Task>, StorageError> {
        let mut tasks = built_in_tasks(now_millis());
        tasks.extend(self.custom_tasks().await?);
        Ok(tasks)
    }

    pub async fn get_task(&self, id: &str) -> Result<Option<Task>, StorageError> {
        Ok(self.get_tasks().await?.into_iter().find(|t| t.id == id))
    }

    async fn custom_tasks(&self) -> Result<Vec<Task>, StorageError> {
        Ok(self.read(keys::TASKS).await?.unwrap_or_default())
    }

    /// Insert or replace a custom task by id.
    pub async fn save_task(&self, task: &Task) -> Result<(), StorageError> {
        if task.is_built_in {
            return Err(StorageError::BuiltInTask);
        }

        let mut tasks = self.custom_tasks().await?;
        match tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task.clone(),
            None => tasks.push(task.clone()),
        }
        self.write(keys::TASKS, &tasks).await
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), StorageError> {
        let mut tasks = self.custom_tasks().await?;
        tasks.retain(|t| t.id != id);
        self.write(keys::TASKS, &tasks).await
    }

    // Blacklist

    pub async fn get_blacklist(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.read(keys::BLACKLIST).await?.unwrap_or_default())
    }

    pub async fn save_blacklist(&self, domains: &[String]) -> Result<(), StorageError> {
        self.write(keys::BLACKLIST, &domains).await
    }

    pub async fn add_to_blacklist(&self, domain: &str) -> Result<(), StorageError> {
        let mut blacklist = self.get_blacklist().await?;
        if !blacklist.iter().any(|d| d == domain) {
            blacklist.push(domain.to_string());
            self.save_blacklist(&blacklist).await?;
        }
        Ok(())
    }

    pub async fn remove_from_blacklist(&self, domain: &str) -> Result<(), StorageError> {
        let mut blacklist = self.get_blacklist().await?;
        blacklist.retain(|d| d != domain);
        self.save_blacklist(&blacklist).await
    }

    // Navigation marker

    pub async fn get_navigation_state(&self) -> Result<Option<NavigationState>, StorageError> {
        self.read(keys::NAVIGATION_STATE).await
    }

    pub async fn set_navigation_state(
        &self,
        state: Option<&NavigationState>,
    ) -> Result<(), StorageError> {
        match state {
            Some(state) => self.write(keys::NAVIGATION_STATE, state).await,
            None => self.store.remove(keys::NAVIGATION_STATE).await,
        }
    }

    // Execution state slot

    pub async fn get_execution_state(&self) -> Result<Option<ExecutionState>, StorageError> {
        self.read(keys::EXECUTION_STATE).await
    }

    pub async fn set_execution_state(
        &self,
        state: Option<&ExecutionState>,
    ) -> Result<(), StorageError> {
        match state {
            Some(state) => self.write(keys::EXECUTION_STATE, state).await,
            None => self.store.remove(keys::EXECUTION_STATE).await,
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
