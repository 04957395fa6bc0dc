//! # Buddy Protocols
//!
//! Shared vocabulary for the Buddy browser assistant: conversation types,
//! persisted records, the bus envelope format, the fixed browser tool set and
//! the traits the runtime is wired through.
//!
//! ## Core Traits
//!
//! - [`LLMProvider`] - remote model access
//! - [`HostBus`] - structured message passing to tabs and UI surfaces
//! - [`TabController`] - tab-level navigation and capture

pub mod bus;
pub mod error;
pub mod provider;
pub mod records;
pub mod tool;
pub mod types;

pub use bus::{
    BrowserActionResponse, BusEnvelope, BusRequest, HostBus, OutboundMessage, PermissionChoice,
    TabController, TabId, TabInfo,
};
pub use error::{BusError, NOT_CONFIGURED_MESSAGE, OrchestratorError, ProviderError, ToolError};
pub use provider::{
    CompletionRequest, CompletionResponse, LLMProvider, ModelDefinition, ProviderFactory,
};
pub use records::*;
pub use tool::{BrowserTool, ToolDefinition, ToolRoute};
pub use types::*;
