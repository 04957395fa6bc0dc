//! Runtime behaviour configuration (permissions, execution tracking, tools, bus).

use serde::{Deserialize, Serialize};

use super::default_request_timeout;

/// Permission prompt behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionsConfig {
    /// How long to wait for the user before denying.
    #[serde(default = "default_request_timeout")]
    pub prompt_timeout_secs: u64,

    /// Tools that never prompt.
    #[serde(default = "default_exempt_tools")]
    pub exempt_tools: Vec<String>,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            prompt_timeout_secs: default_request_timeout(),
            exempt_tools: default_exempt_tools(),
        }
    }
}

fn default_exempt_tools() -> Vec<String> {
    vec!["read_page_content".to_string()]
}

/// Execution state tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Age after which a processing state is considered abandoned.
    #[serde(default = "default_stale_after")]
    pub stale_after_secs: u64,

    /// Delay before telling a freshly loaded tab about pending work.
    #[serde(default = "default_restore_delay")]
    pub restore_delay_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: default_stale_after(),
            restore_delay_ms: default_restore_delay(),
        }
    }
}

fn default_stale_after() -> u64 {
    300
}

fn default_restore_delay() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default = "default_max_screenshot_width")]
    pub max_screenshot_width: u32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_screenshot_width: default_max_screenshot_width(),
        }
    }
}

fn default_max_screenshot_width() -> u32 {
    1024
}

/// Host bus round trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
        }
    }
}
