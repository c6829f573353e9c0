//! Mistral configuration

use policy_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.mistral.ai";
pub const DEFAULT_EMBED_MODEL: &str = "mistral-embed";
pub const DEFAULT_CHAT_MODEL: &str = "mistral-large-latest";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the Mistral client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistralConfig {
    #[serde(skip_serializing, default)]
    pub api_key: String,
    pub api_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub timeout_secs: u64,
}

impl MistralConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = non_empty("MISTRAL_API_KEY").ok_or_else(|| {
            Error::Configuration("MISTRAL_API_KEY environment variable not found".to_string())
        })?;

        let timeout_secs = match non_empty("MISTRAL_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Configuration(format!(
                    "MISTRAL_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            api_url: non_empty("MISTRAL_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            embedding_model: non_empty("MISTRAL_EMBED_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBED_MODEL.to_string()),
            chat_model: non_empty("MISTRAL_CHAT_MODEL")
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            timeout_secs,
        })
    }

    /// Create configuration with explicit values
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
            embedding_model: DEFAULT_EMBED_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Point the client at a different base URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
