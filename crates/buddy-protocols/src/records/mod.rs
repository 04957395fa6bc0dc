//! Records persisted to storage and exchanged with UI surfaces.
//!
//! Every record serializes with camelCase field names and millisecond
//! timestamps.

mod conversation;
mod execution;
mod settings;
mod task;

pub use conversation::*;
pub use execution::*;
pub use settings::*;
pub use task::*;
