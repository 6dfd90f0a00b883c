//! Messaging configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;

/// Outbound messaging settings
#[derive(Debug, Clone, Deserialize)]
pub struct MessagingConfig {
    /// Bound on a single outbound send, in seconds
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,

    /// Directory inbound attachments are read from
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,
}

impl MessagingConfig {
    /// Get send timeout as Duration
    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    /// Validate messaging configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.send_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            send_timeout_secs: default_send_timeout(),
            media_dir: default_media_dir(),
        }
    }
}

fn default_send_timeout() -> u64 {
    10
}

fn default_media_dir() -> PathBuf {
    PathBuf::from(".")
}
