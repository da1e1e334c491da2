//! Hosted language model configuration.
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY`: API key (required)
//! - `LLM_MODEL`: model name (default: `gpt-3.5-turbo`)
//! - `LLM_TEMPERATURE`: sampling temperature (default: 0)
//! - `OPENAI_BASE_URL`: API root (default: `https://api.openai.com/v1`)
//! - `LLM_TIMEOUT_SECS`: per-request timeout (default: 60)

use std::fmt;

use crate::ConfigError;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(crate::env_lookup)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `OPENAI_API_KEY` is absent or
    /// blank, and [`ConfigError::Invalid`] for a temperature outside `0..=2`.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;

        let defaults = Self::new(api_key);

        let temperature = crate::parse_or(&lookup, "LLM_TEMPERATURE", defaults.temperature);
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::Invalid {
                key: "LLM_TEMPERATURE",
                reason: format!("{temperature} is outside 0..=2"),
            });
        }

        Ok(Self {
            model: lookup("LLM_MODEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.model.clone()),
            temperature,
            base_url: lookup("OPENAI_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.base_url.clone()),
            timeout_secs: crate::parse_or(&lookup, "LLM_TIMEOUT_SECS", defaults.timeout_secs),
            ..defaults
        })
    }
}
