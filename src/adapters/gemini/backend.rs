//! Gemini Backend - Implementation of GenerativeBackend over the REST API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new()
//!     .with_chat_model("gemini-2.5-flash-lite")
//!     .with_vision_model("gemini-2.5-flash")
//!     .with_timeout(Duration::from_secs(120));
//!
//! let backend = GeminiBackend::new(config)?;
//! ```
//!
//! The API key is supplied per call by the rotating client and sent in the
//! `x-goog-api-key` header, never in the URL.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;
use tracing::debug;

use super::wire::{classify_status, GenerateContentRequest, GenerateContentResponse};
use crate::ports::{BackendError, BackendInfo, Generation, GenerationRequest, GenerativeBackend};

/// Default REST base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the Gemini backend.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Model for chat continuation.
    pub chat_model: String,
    /// Model for inline attachments.
    pub vision_model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiConfig {
    /// Creates a configuration with default models.
    pub fn new() -> Self {
        Self {
            chat_model: "gemini-2.5-flash-lite".to_string(),
            vision_model: "gemini-2.5-flash".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Sets the chat model.
    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    /// Sets the vision model.
    pub fn with_vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Gemini REST backend.
pub struct GeminiBackend {
    config: GeminiConfig,
    client: Client,
}

impl GeminiBackend {
    /// Creates a backend; fails if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::session_failed(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn model_for(&self, request: &GenerationRequest) -> &str {
        match request {
            GenerationRequest::Chat { .. } => &self.config.chat_model,
            GenerationRequest::Attachment { .. } => &self.config.vision_model,
        }
    }

    /// Builds the generateContent endpoint URL.
    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    fn body_for(request: &GenerationRequest) -> GenerateContentRequest {
        match request {
            GenerationRequest::Chat { turns } => GenerateContentRequest::chat(turns),
            GenerationRequest::Attachment { prompt, attachment } => {
                GenerateContentRequest::attachment(prompt, attachment)
            }
        }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate(
        &self,
        api_key: &Secret<String>,
        request: &GenerationRequest,
    ) -> Result<Generation, BackendError> {
        let api_key = api_key.expose_secret();
        if api_key.trim().is_empty() {
            return Err(BackendError::session_failed("API key is blank"));
        }

        let model = self.model_for(request);
        let body = Self::body_for(request);

        debug!(model, kind = request.kind(), "Sending generateContent request");

        let response = self
            .client
            .post(self.generate_url(model))
            .header("x-goog-api-key", api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::fatal(format!(
                        "request timed out after {}s",
                        self.config.timeout.as_secs()
                    ))
                } else if e.is_connect() {
                    BackendError::fatal(format!("Connection failed: {}", e))
                } else {
                    BackendError::fatal(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &error_body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| BackendError::fatal(format!("Failed to parse response: {}", e)))?;

        Ok(Generation {
            text: parsed.into_text(),
            model: model.to_string(),
        })
    }

    fn backend_info(&self) -> BackendInfo {
        BackendInfo::new("gemini", &self.config.chat_model, &self.config.vision_model)
    }
}
