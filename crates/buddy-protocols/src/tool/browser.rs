//! The fixed set of browser tools the model may call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::ToolDefinition;
use crate::error::ToolError;

/// Browser tool identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserTool {
    ReadPageContent,
    PageSnapshot,
    DomSnapshot,
    Click,
    TypeText,
    ScrollDown,
    ScrollUp,
    NavigateBack,
    NavigateForward,
    GoToUrl,
}

/// How a tool reaches the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolRoute {
    /// Handled by the tab controller without touching page scripts.
    Tab,
    /// Needs a round trip to the script running inside the page.
    PageScript,
}

impl BrowserTool {
    pub const ALL: [BrowserTool; 10] = [
        BrowserTool::ReadPageContent,
        BrowserTool::PageSnapshot,
        BrowserTool::DomSnapshot,
        BrowserTool::Click,
        BrowserTool::TypeText,
        BrowserTool::ScrollDown,
        BrowserTool::ScrollUp,
        BrowserTool::NavigateBack,
        BrowserTool::NavigateForward,
        BrowserTool::GoToUrl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserTool::ReadPageContent => "read_page_content",
            BrowserTool::PageSnapshot => "page_snapshot",
            BrowserTool::DomSnapshot => "dom_snapshot",
            BrowserTool::Click => "click",
            BrowserTool::TypeText => "type_text",
            BrowserTool::ScrollDown => "scroll_down",
            BrowserTool::ScrollUp => "scroll_up",
            BrowserTool::NavigateBack => "navigate_back",
            BrowserTool::NavigateForward => "navigate_forward",
            BrowserTool::GoToUrl => "go_to_url",
        }
    }

    pub fn route(&self) -> ToolRoute {
        match self {
            BrowserTool::NavigateBack | BrowserTool::NavigateForward | BrowserTool::GoToUrl => {
                ToolRoute::Tab
            }
            _ => ToolRoute::PageScript,
        }
    }

    /// Label shown when asking the user for permission.
    pub fn friendly_name(&self) -> &'static str {
        match self {
            BrowserTool::ReadPageContent => "Read page content",
            BrowserTool::PageSnapshot => "Take a screenshot",
            BrowserTool::DomSnapshot => "Read page structure",
            BrowserTool::Click => "Click on an element",
            BrowserTool::TypeText => "Type text",
            BrowserTool::ScrollDown => "Scroll down",
            BrowserTool::ScrollUp => "Scroll up",
            BrowserTool::NavigateBack => "Go back",
            BrowserTool::NavigateForward => "Go forward",
            BrowserTool::GoToUrl => "Navigate to URL",
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        let (description, schema) = match self {
            BrowserTool::ReadPageContent => (
                "Read the visible content of the current web page. Use this when the user asks about \"this page\", \"this site\", \"this repo\", or needs information from the current webpage.",
                None,
            ),
            BrowserTool::PageSnapshot => (
                "Take a visual screenshot of the current page. Returns a screenshot of the visible area of the page, scaled to max 1024px width.",
                None,
            ),
            BrowserTool::DomSnapshot => (
                "Get a structured DOM representation of the current page including element IDs, classes, text content, and interactive elements.",
                None,
            ),
            BrowserTool::Click => (
                "Click on an element on the page. You can identify the element either by its visible text or by its ID.",
                Some(json!({
                    "type": "object",
                    "properties": {
                        "element_text": {
                            "type": "string",
                            "description": "The visible text of the element to click"
                        },
                        "element_id": {
                            "type": "string",
                            "description": "The ID attribute of the element to click"
                        },
                        "exact": {
                            "type": "boolean",
                            "description": "Whether to match text exactly or allow partial matches. Default is true."
                        }
                    },
                    "required": []
                })),
            ),
            BrowserTool::TypeText => (
                "Type text into the currently focused element. Simulates real keystrokes with human-like delays.",
                Some(json!({
                    "type": "object",
                    "properties": {
                        "input_text": {
                            "type": "string",
                            "description": "The text to type into the focused element"
                        }
                    },
                    "required": ["input_text"]
                })),
            ),
            BrowserTool::ScrollDown => (
                "Scroll down by one viewport height with smooth animation.",
                None,
            ),
            BrowserTool::ScrollUp => ("Scroll up by one viewport height with smooth animation.", None),
            BrowserTool::NavigateBack => (
                "Navigate back to the previous page in browser history.",
                None,
            ),
            BrowserTool::NavigateForward => (
                "Navigate forward to the next page in browser history.",
                None,
            ),
            BrowserTool::GoToUrl => (
                "Navigate the current tab to a specific URL.",
                Some(json!({
                    "type": "object",
                    "properties": {
                        "url": {
                            "type": "string",
                            "description": "The URL to navigate to"
                        }
                    },
                    "required": ["url"]
                })),
            ),
        };

        let definition = ToolDefinition::new(self.as_str(), description);
        match schema {
            Some(schema) => definition.with_input_schema(schema),
            None => definition,
        }
    }

    /// Definitions for every browser tool, in advertising order.
    pub fn all_definitions() -> Vec<ToolDefinition> {
        Self::ALL.iter().map(|tool| tool.definition()).collect()
    }
}

impl fmt::Display for BrowserTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserTool {
    type Err = ToolError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|tool| tool.as_str() == name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }
}

#[cfg(test)]
#[path = "browser_tests.rs"]
mod tests;
