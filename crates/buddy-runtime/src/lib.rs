//! # Buddy Runtime
//!
//! The tool-calling conversation loop and the background service around it.
//!
//! - [`PermissionGate`] decides whether a browser tool may run
//! - [`BrowserToolExecutor`] turns tool calls into browser effects
//! - [`Orchestrator`] drives model requests until a plain-text answer arrives
//! - [`ExecutionTracker`] keeps in-flight requests visible across page loads
//! - [`BackgroundService`] answers the host bus vocabulary

pub mod execution;
pub mod executor;
pub mod orchestrator;
pub mod permission;
pub mod screenshot;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

pub use execution::ExecutionTracker;
pub use executor::{BrowserToolExecutor, ToolExecutor};
pub use orchestrator::{
    NO_RESPONSE_TEXT, Orchestrator, OrchestratorSettings, ToolCallObserver, TurnOutcome,
    TurnRequest,
};
pub use permission::{PermissionCheck, PermissionDecision, PermissionGate};
pub use screenshot::downscale_data_url;
pub use service::{BackgroundService, ChatReply, MANAGEMENT_PAGE, ServiceError, TabLoadOutcome};
