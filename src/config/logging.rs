//! Logging configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Tracing subscriber settings
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_filter")]
    pub filter: String,

    /// `pretty` or `json`
    #[serde(default = "default_format")]
    pub format: String,
}

impl LoggingConfig {
    /// Parsed output format
    pub fn format(&self) -> Result<LogFormat, ValidationError> {
        match self.format.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ValidationError::InvalidLogFormat(other.to_string())),
        }
    }

    /// Validate logging configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.format().map(|_| ())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: default_format(),
        }
    }
}

fn default_filter() -> String {
    "info,gemini_relay=debug,sqlx=warn".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}
