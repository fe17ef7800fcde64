//! Configuration system for Scout.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment.
//! Configuration is loaded from `~/.config/scout/config.toml` (or the platform
//! equivalent) and environment variables prefixed `SCOUT_` (nested fields
//! separated by `__`, e.g. `SCOUT_LLM__MODEL`).

use crate::error::ConfigError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the Scout agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoutConfig {
    pub llm: LlmConfig,
    pub search: SearchConfig,
}

/// Configuration for the LLM provider used by the synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier (e.g., "gemini-1.5-flash").
    pub model: String,
    /// Environment variable name containing the API key.
    pub api_key_env: String,
    /// Optional base URL override for the API endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Maximum tokens to generate in a response.
    pub max_output_tokens: usize,
    /// Default temperature for generation.
    pub temperature: f32,
    /// Optional credential store key (provider name in the OS credential store).
    /// Checked before the environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_store_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            base_url: None,
            max_output_tokens: 8192,
            temperature: 0.5,
            credential_store_key: Some("gemini".to_string()),
        }
    }
}

impl LlmConfig {
    /// Validate this LLM config and return any warnings.
    ///
    /// Returns an empty Vec if the config is valid; human-readable warnings
    /// for problematic values otherwise (does not error).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.max_output_tokens == 0 {
            warnings.push("max_output_tokens is 0; every response will be empty".to_string());
        }
        if self.temperature < 0.0 || self.temperature > 2.0 {
            warnings.push(format!(
                "temperature ({}) is outside the typical range 0.0–2.0",
                self.temperature
            ));
        }
        warnings
    }
}

/// Configuration for the web-search provider used by the collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search engine selector sent to the provider.
    pub engine: String,
    /// Environment variable name containing the API key.
    pub api_key_env: String,
    /// Optional base URL override for the API endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Optional credential store key, checked before the environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_store_key: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine: "google".to_string(),
            api_key_env: "SERPAPI_API_KEY".to_string(),
            base_url: None,
            credential_store_key: Some("serpapi".to_string()),
        }
    }
}

/// Default user config file path (`~/.config/scout/config.toml` on Linux).
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "scout")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration with layering: defaults -> config file -> environment.
pub fn load_config(config_path: Option<&Path>) -> Result<ScoutConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(ScoutConfig::default()));

    match config_path {
        Some(path) => {
            figment = figment.merge(Toml::file(path));
        }
        None => {
            if let Some(user_config) = default_config_path()
                && user_config.exists()
            {
                figment = figment.merge(Toml::file(&user_config));
            }
        }
    }

    figment = figment.merge(Env::prefixed("SCOUT_").split("__"));

    figment.extract().map_err(|e| ConfigError::ParseError {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ScoutConfig::default();
        assert_eq!(config.llm.model, "gemini-1.5-flash");
        assert_eq!(config.llm.api_key_env, "GOOGLE_API_KEY");
        assert_eq!(config.search.engine, "google");
        assert_eq!(config.search.api_key_env, "SERPAPI_API_KEY");
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[llm]\nmodel = \"gemini-1.5-pro\"\ntemperature = 0.2\n\n[search]\nengine = \"google\""
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.llm.model, "gemini-1.5-pro");
        assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
        // Unspecified fields keep their defaults.
        assert_eq!(config.llm.max_output_tokens, 8192);
    }

    #[test]
    fn test_validate_warns_on_bad_temperature() {
        let config = LlmConfig {
            temperature: 5.0,
            ..LlmConfig::default()
        };
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("temperature"));
    }

    #[test]
    fn test_validate_clean_config() {
        assert!(LlmConfig::default().validate().is_empty());
    }
}
