//! Anthropic Messages API provider for Buddy.

mod api;
mod converter;
mod factory;
mod models;
mod parser;
mod provider;

pub use factory::AnthropicProviderFactory;
pub use models::get_models;
pub use provider::{AnthropicProvider, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS};
