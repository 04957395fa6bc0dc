//! Error types shared across the Buddy crates.

mod bus;
mod orchestrator;
mod provider;
mod tool;

pub use bus::*;
pub use orchestrator::*;
pub use provider::*;
pub use tool::*;
