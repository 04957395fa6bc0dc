//! # Buddy Config
//!
//! TOML configuration for the Buddy runtime: schema with defaults, a loader
//! that expands `${VAR}` references, and a validator.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
