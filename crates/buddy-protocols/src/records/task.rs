//! Task records.

use serde::{Deserialize, Serialize};

use crate::types::Millis;

/// Where a task takes its input from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskInputType {
    Page,
    Selection,
}

/// A canned prompt applied to page content or a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub input_type: TaskInputType,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub is_built_in: bool,
    #[serde(default)]
    pub created_at: Millis,
    #[serde(default)]
    pub updated_at: Millis,
}

impl Task {
    /// Build the user turn sent to the model for this task.
    pub fn render_prompt(&self, content: &str) -> String {
        format!("{}\n\nContent to process:\n{}", self.prompt, content)
    }
}

pub const SUMMARIZE_PAGE_TASK_ID: &str = "summarize-page";
pub const REPHRASE_TEXT_TASK_ID: &str = "rephrase-text";

/// The tasks every installation ships with.
pub fn built_in_tasks(now: Millis) -> Vec<Task> {
    vec![
        Task {
            id: SUMMARIZE_PAGE_TASK_ID.to_string(),
            name: "Summarize this page".to_string(),
            description: "Create a concise summary of the current page content".to_string(),
            input_type: TaskInputType::Page,
            prompt: "Please provide a clear, concise summary of this webpage content. Focus on the main points and key information.".to_string(),
            icon: None,
            color: None,
            is_built_in: true,
            created_at: now,
            updated_at: now,
        },
        Task {
            id: REPHRASE_TEXT_TASK_ID.to_string(),
            name: "Rephrase selected text".to_string(),
            description: "Improve or rephrase the selected text".to_string(),
            input_type: TaskInputType::Selection,
            prompt: "Please rephrase the following text to be clearer, more professional, or better written while maintaining the original meaning:".to_string(),
            icon: None,
            color: None,
            is_built_in: true,
            created_at: now,
            updated_at: now,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_ins() {
        let tasks = built_in_tasks(5);
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.is_built_in));
        assert_eq!(tasks[0].input_type, TaskInputType::Page);
        assert_eq!(tasks[1].id, REPHRASE_TEXT_TASK_ID);
    }

    #[test]
    fn test_render_prompt() {
        let task = &built_in_tasks(0)[0];
        let rendered = task.render_prompt("Hello world");
        assert!(rendered.starts_with("Please provide a clear"));
        assert!(rendered.ends_with("\n\nContent to process:\nHello world"));
    }

    #[test]
    fn test_custom_task_from_ui() {
        let json = r##"{"id":"x","name":"Translate","inputType":"selection","prompt":"Translate:","color":"#ff0000"}"##;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(!task.is_built_in);
        assert_eq!(task.color.as_deref(), Some("#ff0000"));
        assert_eq!(task.description, "");
    }
}
