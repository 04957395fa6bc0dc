//! Storage key layout.

pub const SETTINGS: &str = "buddy_settings";
pub const API_KEY: &str = "buddy_api_key";
pub const CURRENT_CONVERSATION: &str = "buddy_current_conversation";
pub const EXECUTION_STATE: &str = "buddy_execution_state";
pub const NAVIGATION_STATE: &str = "buddy_navigation_state";
pub const TASKS: &str = "buddy_tasks";
pub const BLACKLIST: &str = "buddy_blacklist";

/// Pre-migration key holding every conversation in one array.
pub const LEGACY_CONVERSATIONS: &str = "buddy_conversations";

pub const CONVERSATION_PREFIX: &str = "buddy_conv_";

pub fn conversation_key(id: &str) -> String {
    format!("{CONVERSATION_PREFIX}{id}")
}

pub fn is_conversation_key(key: &str) -> bool {
    key.starts_with(CONVERSATION_PREFIX)
}
