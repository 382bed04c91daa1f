use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, prompts::Prompts};

/// Everything the arena reads from its TOML file. Every field has a
/// default, so an empty file is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub acquisition: AcquisitionConfig,
    pub prompts: Prompts,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Round trips an agent gets per turn before it forfeits.
    pub max_attempts: u32,
    pub round_trip_timeout_secs: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            round_trip_timeout_secs: 60,
        }
    }
}

impl AcquisitionConfig {
    pub fn round_trip_timeout(&self) -> Duration {
        Duration::from_secs(self.round_trip_timeout_secs)
    }
}

/// An OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "openai/gpt-4.1-mini".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            temperature: None,
        }
    }
}

impl ArenaConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ArenaConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.acquisition.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "acquisition.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.acquisition.round_trip_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "acquisition.round_trip_timeout_secs must be at least 1".to_string(),
            ));
        }
        if let Some(t) = self.llm.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::Invalid(format!(
                    "llm.temperature {t} is outside 0.0..=2.0"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
