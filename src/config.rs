//! Configuration types.

use std::str::FromStr;

use crate::error::ConfigError;

/// Tuning for the enrichment pipeline. The API key is read separately so
/// this struct stays `Default`-constructible for tests.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Model identifier passed to the completion service.
    pub model: String,
    /// Base URL of the OpenAI-compatible endpoint (no trailing path).
    pub base_url: String,
    /// Sampling temperature for the structured extractions.
    pub temperature: f32,
    /// Cap on generated units per completion call.
    pub max_tokens: u32,
    /// Retry budget per enrichment task (total attempts).
    pub max_tries: u32,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.1, // structured extraction wants near-deterministic output
            max_tokens: 512,
            max_tries: 3,
        }
    }
}

impl EnrichConfig {
    /// Build a config from `MSG_ENRICH_*` environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            model: std::env::var("MSG_ENRICH_MODEL").unwrap_or(defaults.model),
            base_url: std::env::var("MSG_ENRICH_BASE_URL").unwrap_or(defaults.base_url),
            temperature: parse_env("MSG_ENRICH_TEMPERATURE", defaults.temperature)?,
            max_tokens: parse_env("MSG_ENRICH_MAX_TOKENS", defaults.max_tokens)?,
            max_tries: parse_env("MSG_ENRICH_MAX_TRIES", defaults.max_tries)?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{e} (got {raw:?})"),
    })
}
