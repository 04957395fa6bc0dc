//! Key/value stores.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::StorageError;

/// Persistent key/value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Store a value, replacing any previous one.
    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError>;

    /// Remove a key. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All stored keys, in no particular order.
    async fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Reject items larger than `limit` bytes, counting the key and the compact
/// JSON encoding of the value. A zero limit disables the check.
fn check_quota(key: &str, value: &Value, limit: usize) -> Result<(), StorageError> {
    if limit == 0 {
        return Ok(());
    }
    let size = key.len() + serde_json::to_string(value)?.len();
    if size > limit {
        return Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

/// In-memory store.
pub struct MemoryStore {
    items: RwLock<HashMap<String, Value>>,
    max_item_bytes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            max_item_bytes: 0,
        }
    }

    /// Enforce a per-item size limit.
    pub fn with_max_item_bytes(mut self, limit: usize) -> Self {
        self.max_item_bytes = limit;
        self
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let items = self.items.read().await;
        Ok(items.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        check_quota(key, value, self.max_item_bytes)?;
        let mut items = self.items.write().await;
        items.insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().await;
        items.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let items = self.items.read().await;
        Ok(items.keys().cloned().collect())
    }
}

/// On-disk layout of one item.
#[derive(Debug, Serialize, Deserialize)]
struct StoredItem {
    key: String,
    value: Value,
}

/// File system store.
///
/// Each key is stored as its own JSON file:
/// ```text
/// {storage_path}/
/// ├── buddy_settings.json
/// ├── buddy_conv_{id}.json
/// └── ...
/// ```
pub struct FileStore {
    storage_path: PathBuf,
    max_item_bytes: usize,
}

impl FileStore {
    /// Create a store rooted at `storage_path`, creating the directory.
    pub async fn new(storage_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let storage_path = storage_path.into();
        fs::create_dir_all(&storage_path).await?;

        debug!("FileStore initialized at {:?}", storage_path);

        Ok(Self {
            storage_path,
            max_item_bytes: 0,
        })
    }

    pub fn with_max_item_bytes(mut self, limit: usize) -> Self {
        self.max_item_bytes = limit;
        self
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.storage_path
            .join(format!("{}.json", Self::sanitize_key(key)))
    }

    fn sanitize_key(key: &str) -> String {
        key.chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect()
    }

    async fn read_item(&self, path: &PathBuf) -> Option<StoredItem> {
        match fs::read_to_string(path).await {
            Ok(content) => match serde_json::from_str::<StoredItem>(&content) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Failed to deserialize item from {:?}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to read item file {:?}: {}", path, e);
                None
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let path = self.item_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        let item: StoredItem = serde_json::from_str(&content)?;
        // Distinct keys can sanitize to the same file name.
        if item.key != key {
            debug!("'{}' shares a file with '{}'", key, item.key);
            return Ok(None);
        }
        Ok(Some(item.value))
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        check_quota(key, value, self.max_item_bytes)?;

        let item = StoredItem {
            key: key.to_string(),
            value: value.clone(),
        };
        let content = serde_json::to_string_pretty(&item)?;
        let path = self.item_path(key);
        fs::write(&path, content).await?;

        debug!("Saved '{}' to {:?}", key, path);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.item_path(key);
        if path.exists() {
            fs::remove_file(&path).await?;
            debug!("Removed '{}'", key);
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        let mut entries = fs::read_dir(&self.storage_path).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(item) = self.read_item(&path).await {
                    keys.push(item.key);
                }
            }
        }

        Ok(keys)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
