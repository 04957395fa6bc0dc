//! Browser tool execution errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("No context available")]
    NoContext,

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Page unreachable: {0}")]
    PageUnreachable(String),

    #[error("Tool execution timed out after {0} seconds")]
    Timeout(u64),
}
