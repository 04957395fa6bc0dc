//! User settings.

use serde::{Deserialize, Serialize};

use crate::records::{REPHRASE_TEXT_TASK_ID, SUMMARIZE_PAGE_TASK_ID};

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_selected_model")]
    pub selected_model: String,

    #[serde(default)]
    pub show_debug_messages: bool,

    #[serde(default = "default_sidebar_width")]
    pub sidebar_width: u32,

    #[serde(default = "default_icon_position")]
    pub icon_position: u32,

    #[serde(default)]
    pub blacklisted_sites: Vec<String>,

    #[serde(default = "default_default_tasks")]
    pub default_tasks: Vec<String>,

    #[serde(default = "default_conversation_retention")]
    pub conversation_retention: usize,
}

fn default_selected_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_sidebar_width() -> u32 {
    400
}

fn default_icon_position() -> u32 {
    50
}

fn default_default_tasks() -> Vec<String> {
    vec![
        SUMMARIZE_PAGE_TASK_ID.to_string(),
        REPHRASE_TEXT_TASK_ID.to_string(),
    ]
}

fn default_conversation_retention() -> usize {
    50
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            selected_model: default_selected_model(),
            show_debug_messages: false,
            sidebar_width: default_sidebar_width(),
            icon_position: default_icon_position(),
            blacklisted_sites: Vec::new(),
            default_tasks: default_default_tasks(),
            conversation_retention: default_conversation_retention(),
        }
    }
}

impl Settings {
    /// Apply a partial update given as a JSON object.
    ///
    /// Keys present in `patch` replace the current values; everything else is
    /// kept. Unknown keys are ignored.
    pub fn merged(&self, patch: &serde_json::Value) -> Result<Settings, serde_json::Error> {
        let mut current = serde_json::to_value(self)?;
        if let (Some(target), Some(updates)) = (current.as_object_mut(), patch.as_object()) {
            for (key, value) in updates {
                target.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(current)
    }
}
