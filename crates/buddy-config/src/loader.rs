//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        debug!("Loading config from {}", path.display());
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Load the file at `path`, or the default location, falling back to
    /// built-in defaults when the default file does not exist.
    ///
    /// An explicitly given path that does not exist is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    /// `~/.buddy/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".buddy").join("config.toml"))
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        let mut result = content.to_string();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.buddy`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.orchestrator.max_rounds, 10);
        assert_eq!(config.anthropic.max_tokens, 4000);
    }

    #[test]
    fn test_load_sections() {
        let content = r#"
            [anthropic]
            model = "claude-3-haiku-20240307"
            max_tokens = 1024

            [orchestrator]
            max_rounds = 4
            request_timeout_secs = 15

            [permissions]
            prompt_timeout_secs = 5
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.anthropic.model, "claude-3-haiku-20240307");
        assert_eq!(config.anthropic.max_tokens, 1024);
        assert_eq!(config.orchestrator.max_rounds, 4);
        assert_eq!(config.orchestrator.request_timeout_secs, 15);
        assert_eq!(config.orchestrator.history_window, 10);
        assert_eq!(config.permissions.prompt_timeout_secs, 5);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[browser]").unwrap();
        writeln!(file, "cdp_endpoint = \"http://127.0.0.1:9333\"").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.browser.cdp_endpoint, "http://127.0.0.1:9333");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/buddy.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_with_explicit_missing_path() {
        let result = ConfigLoader::load_or_default(Some(Path::new("/nonexistent/buddy.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("BUDDY_TEST_CONFIG_KEY", "sk-ant-test");
        }
        let config = ConfigLoader::load_str(
            "[anthropic]\napi_key = \"${BUDDY_TEST_CONFIG_KEY}\"",
        )
        .unwrap();
        assert_eq!(config.anthropic.api_key.as_deref(), Some("sk-ant-test"));
        unsafe {
            std::env::remove_var("BUDDY_TEST_CONFIG_KEY");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let result = ConfigLoader::expand_env_vars("value = \"${BUDDY_NONEXISTENT_VAR_4821}\"");
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = ConfigLoader::expand_path("~/.buddy/storage");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/.buddy/storage"));
    }

    #[test]
    fn test_expand_path_no_tilde() {
        assert_eq!(ConfigLoader::expand_path("/var/lib/buddy"), "/var/lib/buddy");
    }
}
