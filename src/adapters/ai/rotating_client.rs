//! Credential Rotating Client - generation with automatic key rotation.
//!
//! Wraps a `GenerativeBackend` and a `CredentialPool`. When a call fails
//! with a credential-specific error (session failure, quota exhausted) the
//! next key is tried; every key is tried at most once per call. Any other
//! failure stops immediately.
//!
//! # Example
//!
//! ```ignore
//! let backend = GeminiBackend::new(gemini_config)?;
//! let pool = CredentialPool::new(keys)?;
//!
//! let client = CredentialRotatingClient::new(Arc::new(backend), pool);
//! let reply = client.generate(context.turns()).await?;
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, warn};

use super::credential_pool::CredentialPool;
use crate::domain::conversation::PromptTurn;
use crate::ports::{
    BackendInfo, GenerationError, GenerationRequest, GenerativeBackend, InlineAttachment,
};

/// Text returned to the user when the backend produced no content.
pub const NO_RESPONSE_SENTINEL: &str = "No response from model.";

/// Successful result of a generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    /// Generated text.
    Text(String),
    /// The backend answered without content.
    Empty,
}

impl ModelReply {
    /// Text to show the user.
    pub fn as_text(&self) -> &str {
        match self {
            ModelReply::Text(text) => text,
            ModelReply::Empty => NO_RESPONSE_SENTINEL,
        }
    }

    /// Returns true for an empty reply.
    pub fn is_empty(&self) -> bool {
        matches!(self, ModelReply::Empty)
    }
}

impl From<Option<String>> for ModelReply {
    fn from(text: Option<String>) -> Self {
        match text {
            Some(text) if !text.trim().is_empty() => ModelReply::Text(text),
            _ => ModelReply::Empty,
        }
    }
}

impl fmt::Display for ModelReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}

/// Generation client with credential rotation.
pub struct CredentialRotatingClient {
    backend: Arc<dyn GenerativeBackend>,
    pool: CredentialPool,
}

impl CredentialRotatingClient {
    /// Creates a client over a backend and a credential pool.
    pub fn new(backend: Arc<dyn GenerativeBackend>, pool: CredentialPool) -> Self {
        Self { backend, pool }
    }

    /// Backend information.
    pub fn backend_info(&self) -> BackendInfo {
        self.backend.backend_info()
    }

    /// Number of credentials in the pool.
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// Index the next call will start from.
    pub async fn cursor(&self) -> usize {
        self.pool.cursor().await
    }

    /// Continues a chat. The last turn is the new message.
    pub async fn generate(&self, turns: &[PromptTurn]) -> Result<ModelReply, GenerationError> {
        if turns.is_empty() {
            return Err(GenerationError::InvalidRequest(
                "at least one turn is required".to_string(),
            ));
        }

        self.execute(GenerationRequest::Chat {
            turns: turns.to_vec(),
        })
        .await
    }

    /// Single-shot generation over an inline binary and a prompt.
    pub async fn generate_with_attachment(
        &self,
        prompt: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> Result<ModelReply, GenerationError> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::InvalidRequest("prompt is empty".to_string()));
        }
        if mime_type.trim().is_empty() {
            return Err(GenerationError::InvalidRequest(
                "attachment MIME type is empty".to_string(),
            ));
        }
        if data.is_empty() {
            return Err(GenerationError::InvalidRequest("attachment is empty".to_string()));
        }

        self.execute(GenerationRequest::Attachment {
            prompt: prompt.to_string(),
            attachment: InlineAttachment::new(mime_type, data),
        })
        .await
    }

    async fn execute(&self, request: GenerationRequest) -> Result<ModelReply, GenerationError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut lease = self.pool.lease().await;
        let attempts = lease.len();

        for attempt in 1..=attempts {
            let from_index = lease.index();

            let outcome = self.backend.generate(lease.current(), &request).await;

            match outcome {
                Ok(generation) => {
                    debug!(
                        request_id = %request_id,
                        kind = request.kind(),
                        model = %generation.model,
                        credential_index = from_index,
                        attempt,
                        "Generation succeeded"
                    );
                    return Ok(ModelReply::from(generation.text));
                }
                Err(err) if err.rotates() => {
                    let to_index = lease.advance();
                    warn!(
                        request_id = %request_id,
                        from_index,
                        to_index,
                        attempt,
                        error = %err,
                        "Credential failed, rotating to next key"
                    );
                }
                Err(err) => {
                    error!(
                        request_id = %request_id,
                        kind = request.kind(),
                        credential_index = from_index,
                        error = %err,
                        "Generation failed"
                    );
                    return Err(GenerationError::Rejected(err));
                }
            }
        }

        error!(request_id = %request_id, attempts, "All credentials exhausted");
        Err(GenerationError::AllCredentialsExhausted { attempts })
    }
}
