//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error into a `ConfigError`.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

const KNOWN_TOOLS: [&str; 10] = [
    "read_page_content",
    "page_snapshot",
    "dom_snapshot",
    "click",
    "type_text",
    "scroll_down",
    "scroll_up",
    "navigate_back",
    "navigate_forward",
    "go_to_url",
];

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_anthropic(config, &mut result);
        Self::validate_orchestrator(config, &mut result);
        Self::validate_permissions(config, &mut result);
        Self::validate_timeouts(config, &mut result);
        Self::validate_storage(config, &mut result);
        Self::validate_browser(config, &mut result);

        result
    }

    fn validate_anthropic(config: &Config, result: &mut ValidationResult) {
        let anthropic = &config.anthropic;

        if !is_http_url(&anthropic.base_url) {
            result.add_error(ValidationError::new(
                "anthropic.base_url",
                "base_url must start with http:// or https://",
            ));
        }

        if anthropic.model.is_empty() {
            result.add_error(ValidationError::new("anthropic.model", "Model cannot be empty"));
        }

        if anthropic.max_tokens == 0 {
            result.add_error(ValidationError::new(
                "anthropic.max_tokens",
                "max_tokens must be greater than 0",
            ));
        }

        if let Some(key) = &anthropic.api_key {
            if key.trim().is_empty() {
                result.add_warning(ValidationWarning::new(
                    "anthropic.api_key",
                    "api_key is empty, the stored key will be used instead",
                ));
            }
        }
    }

    fn validate_orchestrator(config: &Config, result: &mut ValidationResult) {
        let orchestrator = &config.orchestrator;

        if orchestrator.max_rounds == 0 {
            result.add_error(ValidationError::new(
                "orchestrator.max_rounds",
                "max_rounds must be greater than 0",
            ));
        }

        if orchestrator.max_rounds > 50 {
            result.add_warning(ValidationWarning::new(
                "orchestrator.max_rounds",
                "max_rounds is very high (>50), a looping model may run for a long time",
            ));
        }

        if orchestrator.history_window == 0 {
            result.add_warning(ValidationWarning::new(
                "orchestrator.history_window",
                "history_window is 0, earlier messages will not be sent as context",
            ));
        }
    }

    fn validate_permissions(config: &Config, result: &mut ValidationResult) {
        for tool in &config.permissions.exempt_tools {
            if !KNOWN_TOOLS.contains(&tool.as_str()) {
                result.add_warning(ValidationWarning::new(
                    "permissions.exempt_tools",
                    format!("Unknown tool '{}' has no effect", tool),
                ));
            }
        }
    }

    fn validate_timeouts(config: &Config, result: &mut ValidationResult) {
        let timeouts = [
            ("orchestrator.request_timeout_secs", config.orchestrator.request_timeout_secs),
            ("permissions.prompt_timeout_secs", config.permissions.prompt_timeout_secs),
            ("bus.request_timeout_secs", config.bus.request_timeout_secs),
            ("execution.stale_after_secs", config.execution.stale_after_secs),
        ];

        for (path, value) in timeouts {
            if value == 0 {
                result.add_error(ValidationError::new(path, "must be greater than 0"));
            }
        }
    }

    fn validate_storage(config: &Config, result: &mut ValidationResult) {
        if config.storage.max_messages_per_conversation == 0 {
            result.add_error(ValidationError::new(
                "storage.max_messages_per_conversation",
                "max_messages_per_conversation must be greater than 0",
            ));
        }

        if config.storage.max_item_bytes == 0 {
            result.add_warning(ValidationWarning::new(
                "storage.max_item_bytes",
                "Item size limit disabled",
            ));
        }
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        if !is_http_url(&config.browser.cdp_endpoint) {
            result.add_error(ValidationError::new(
                "browser.cdp_endpoint",
                "cdp_endpoint must start with http:// or https://",
            ));
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
