use std::env;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_MODEL: &str = "gemini-2.5-pro";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_STATIC_DIR: &str = "public";
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Errors that keep the relay from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing GOOGLE_API_KEY in environment")]
    MissingApiKey,

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Process configuration, read once at startup and never mutated.
#[derive(Clone)]
pub struct RelayConfig {
    pub api_key: String,
    pub host: String,
    pub port: u16,
    pub model: String,
    pub api_base: String,
    pub static_dir: PathBuf,
    pub max_body_bytes: usize,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GOOGLE_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let max_body_bytes = match lookup("MAX_BODY_BYTES") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::Invalid {
                    name: "MAX_BODY_BYTES",
                    value,
                })?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Self {
            api_key,
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: lookup("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            static_dir: PathBuf::from(
                lookup("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            ),
            max_body_bytes,
        })
    }
}

// Keeps the credential out of log lines.
impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("api_key", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("static_dir", &self.static_dir)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}
