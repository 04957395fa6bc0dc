//! Infrastructure configuration types (storage, browser, logging).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persistent storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per key.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Per-item size limit in bytes. Zero disables the limit.
    #[serde(default = "default_max_item_bytes")]
    pub max_item_bytes: usize,

    #[serde(default = "default_max_messages")]
    pub max_messages_per_conversation: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            max_item_bytes: default_max_item_bytes(),
            max_messages_per_conversation: default_max_messages(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("~/.buddy/storage")
}

fn default_max_item_bytes() -> usize {
    8192
}

fn default_max_messages() -> usize {
    30
}

/// Browser connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome remote debugging endpoint.
    #[serde(default = "default_cdp_endpoint")]
    pub cdp_endpoint: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            cdp_endpoint: default_cdp_endpoint(),
        }
    }
}

fn default_cdp_endpoint() -> String {
    "http://localhost:9222".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: default_log_directory(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("~/.buddy/logs")
}
