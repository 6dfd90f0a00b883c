//! Generation backend configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::gemini::{GeminiConfig, DEFAULT_BASE_URL};

/// Gemini backend and credential pool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API keys in rotation order (comma-separated in the environment)
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Model for text continuation
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model for inline image and document requests
    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    /// REST base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Trimmed, non-empty keys wrapped as secrets, in configured order.
    pub fn credentials(&self) -> Vec<Secret<String>> {
        self.api_keys
            .iter()
            .map(|key| key.trim())
            .filter(|key| !key.is_empty())
            .map(|key| Secret::new(key.to_string()))
            .collect()
    }

    /// Backend settings derived from this section.
    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig::new()
            .with_chat_model(self.chat_model.clone())
            .with_vision_model(self.vision_model.clone())
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.credentials().is_empty() {
            return Err(ValidationError::MissingRequired("AI__API_KEYS"));
        }
        if self.chat_model.trim().is_empty() || self.vision_model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AI__CHAT_MODEL / AI__VISION_MODEL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            chat_model: default_chat_model(),
            vision_model: default_vision_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_chat_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_vision_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    120
}
