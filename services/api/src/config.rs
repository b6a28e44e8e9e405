//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. The LLM credential is *not* configuration:
//! every request brings its own.

use std::net::SocketAddr;
use tracing::Level;

pub const DEFAULT_LLM_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_QUIZ_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub llm_api_base: String,
    pub quiz_model: String,
    pub review_model: String,
    pub temperature: f32,
    pub max_upload_bytes: usize,
    pub cors_allowed_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: Level::INFO,
            llm_api_base: DEFAULT_LLM_API_BASE.to_string(),
            quiz_model: DEFAULT_QUIZ_MODEL.to_string(),
            review_model: DEFAULT_QUIZ_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_allowed_origin: "http://localhost:3000".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let default = Self::default();

        // --- Server Settings ---
        let bind_address = match lookup("BIND_ADDRESS") {
            Some(raw) => raw
                .parse::<SocketAddr>()
                .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?,
            None => default.bind_address,
        };

        let log_level = match lookup("RUST_LOG") {
            Some(raw) => raw.parse::<Level>().map_err(|_| {
                ConfigError::InvalidValue(
                    "RUST_LOG".to_string(),
                    format!("'{}' is not a valid log level", raw),
                )
            })?,
            None => default.log_level,
        };

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.parse::<usize>().map_err(|e| {
                ConfigError::InvalidValue("MAX_UPLOAD_BYTES".to_string(), e.to_string())
            })?,
            None => default.max_upload_bytes,
        };

        let cors_allowed_origin =
            lookup("CORS_ALLOWED_ORIGIN").unwrap_or(default.cors_allowed_origin);

        // --- LLM Settings ---
        let llm_api_base = lookup("LLM_API_BASE").unwrap_or(default.llm_api_base);
        let quiz_model = lookup("QUIZ_MODEL").unwrap_or(default.quiz_model);
        let review_model = lookup("REVIEW_MODEL").unwrap_or_else(|| quiz_model.clone());

        let temperature = match lookup("LLM_TEMPERATURE") {
            Some(raw) => {
                let value = raw.parse::<f32>().map_err(|e| {
                    ConfigError::InvalidValue("LLM_TEMPERATURE".to_string(), e.to_string())
                })?;
                if !(0.0..=2.0).contains(&value) {
                    return Err(ConfigError::InvalidValue(
                        "LLM_TEMPERATURE".to_string(),
                        format!("{} is outside 0.0..=2.0", value),
                    ));
                }
                value
            }
            None => default.temperature,
        };

        if llm_api_base.trim().is_empty() {
            return Err(ConfigError::MissingVar("LLM_API_BASE".to_string()));
        }

        Ok(Self {
            bind_address,
            log_level,
            llm_api_base,
            quiz_model,
            review_model,
            temperature,
            max_upload_bytes,
            cors_allowed_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.quiz_model, "gemini-2.5-flash");
        assert_eq!(config.review_model, "gemini-2.5-flash");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn review_model_follows_quiz_model() {
        let config = Config::from_lookup(lookup_from(&[("QUIZ_MODEL", "gpt-4o-mini")])).unwrap();
        assert_eq!(config.review_model, "gpt-4o-mini");
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("LLM_TEMPERATURE", "3.5")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "LLM_TEMPERATURE"));
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("RUST_LOG", "chatty")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for the environment variable RUST_LOG: 'chatty' is not a valid log level"
        );
    }
}
