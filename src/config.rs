//! Oracle and credential configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Settings for talking to the chat-completion oracle.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
pub struct OracleConfig {
    /// Model name sent with each request.
    #[serde(default = "default_model")]
    model: String,

    /// Full URL of the chat-completion endpoint.
    #[serde(default = "default_endpoint")]
    endpoint: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    temperature: f64,

    /// Reply length limit.
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,

    /// Key under which the API credential is stored.
    #[serde(default = "default_credential_key")]
    credential_key: String,

    /// File backing the credential store.
    #[serde(default = "default_credentials_path")]
    credentials_path: PathBuf,

    /// Environment variable that seeds the credential store at startup.
    #[serde(default = "default_api_key_env")]
    api_key_env: String,
}

#[instrument]
fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

#[instrument]
fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

#[instrument]
fn default_temperature() -> f64 {
    0.7
}

#[instrument]
fn default_max_tokens() -> u32 {
    100
}

#[instrument]
fn default_credential_key() -> String {
    "openai_api_key".to_string()
}

#[instrument]
fn default_credentials_path() -> PathBuf {
    PathBuf::from("chess_oracle_credentials.toml")
}

#[instrument]
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            credential_key: default_credential_key(),
            credentials_path: default_credentials_path(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl OracleConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(model = %config.model, endpoint = %config.endpoint, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Reads the seeding credential from the configured environment variable.
    #[instrument(skip(self), fields(var = %self.api_key_env))]
    pub fn api_key_from_env(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
