//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `GEMINI_RELAY` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use gemini_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("{} credential(s) configured", config.ai.credentials().len());
//! ```

mod ai;
mod database;
mod error;
mod logging;
mod messaging;
mod persona;
mod store;

pub use ai::AiConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use messaging::MessagingConfig;
pub use persona::PersonaConfig;
pub use store::StoreConfig;

use serde::Deserialize;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "GEMINI_RELAY";

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Gemini backend and credential pool
    #[serde(default)]
    pub ai: AiConfig,

    /// SQLite history store
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Persona/knowledge injection
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Outbound messaging
    #[serde(default)]
    pub messaging: MessagingConfig,

    /// Store info for `/location` and `/menu`
    #[serde(default)]
    pub store: StoreConfig,

    /// Tracing subscriber
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `GEMINI_RELAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Splits `AI__API_KEYS` on commas
    ///
    /// # Environment Variable Format
    ///
    /// - `GEMINI_RELAY__AI__API_KEYS=key-a,key-b` -> `ai.api_keys = ["key-a", "key-b"]`
    /// - `GEMINI_RELAY__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("ai.api_keys")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.database.validate()?;
        self.messaging.validate()?;
        self.store.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
