//! Generative Backend Port - Interface for one generation call with one credential.
//!
//! This port abstracts a single request against the model backend. Credential
//! selection and rotation live above it (see `CredentialRotatingClient`); the
//! backend only reports *how* a call failed so the caller can decide whether
//! another credential is worth trying.
//!
//! # Design
//!
//! - Two request shapes: chat continuation and single-shot inline attachment
//! - Structured failure classification instead of error-string matching
//! - `Generation::text == None` means the backend answered with no content

use async_trait::async_trait;
use secrecy::Secret;
use serde::{Deserialize, Serialize};

use crate::domain::conversation::PromptTurn;

/// Port for model backend calls.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Executes one request using the given API key.
    async fn generate(
        &self,
        api_key: &Secret<String>,
        request: &GenerationRequest,
    ) -> Result<Generation, BackendError>;

    /// Get backend information (name, models).
    fn backend_info(&self) -> BackendInfo;
}

/// Binary payload sent inline with a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAttachment {
    /// Declared MIME type.
    pub mime_type: String,
    /// Raw bytes.
    pub data: Vec<u8>,
}

impl InlineAttachment {
    /// Creates an inline attachment.
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }
}

/// A request for the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    /// Chat continuation: all turns but the last are history, the last is
    /// the new message.
    Chat { turns: Vec<PromptTurn> },
    /// Single-shot generation over an inline binary plus a prompt.
    Attachment {
        prompt: String,
        attachment: InlineAttachment,
    },
}

impl GenerationRequest {
    /// Short name of the request shape, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationRequest::Chat { .. } => "chat",
            GenerationRequest::Attachment { .. } => "attachment",
        }
    }
}

/// Successful backend answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Generated text; `None` when the backend returned no content.
    pub text: Option<String>,
    /// Model that produced the answer.
    pub model: String,
}

impl Generation {
    /// Creates a generation with text.
    pub fn text(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            model: model.into(),
        }
    }

    /// Creates a generation without content.
    pub fn empty(model: impl Into<String>) -> Self {
        Self {
            text: None,
            model: model.into(),
        }
    }
}

/// Backend information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendInfo {
    /// Backend name (e.g., "gemini").
    pub name: String,
    /// Model used for chat continuation.
    pub chat_model: String,
    /// Model used for inline attachments.
    pub vision_model: String,
}

impl BackendInfo {
    /// Creates backend info.
    pub fn new(
        name: impl Into<String>,
        chat_model: impl Into<String>,
        vision_model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            chat_model: chat_model.into(),
            vision_model: vision_model.into(),
        }
    }
}

/// How a single backend call failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// A session for this credential could not be created.
    #[error("session creation failed: {0}")]
    SessionFailed(String),

    /// The credential is rate-limited or out of quota.
    #[error("quota exhausted: {0}")]
    QuotaExceeded(String),

    /// Any other failure; not credential-specific.
    #[error("backend request failed: {0}")]
    Fatal(String),
}

impl BackendError {
    /// Creates a session failure.
    pub fn session_failed(message: impl Into<String>) -> Self {
        Self::SessionFailed(message.into())
    }

    /// Creates a quota failure.
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::QuotaExceeded(message.into())
    }

    /// Creates a fatal failure.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal(message.into())
    }

    /// Returns true if the next credential should be tried.
    pub fn rotates(&self) -> bool {
        matches!(
            self,
            BackendError::SessionFailed(_) | BackendError::QuotaExceeded(_)
        )
    }
}

/// Errors surfaced by a full (possibly rotated) generation call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Request violated a precondition; no credential was tried.
    #[error("invalid generation request: {0}")]
    InvalidRequest(String),

    /// The backend failed in a way rotation cannot fix.
    #[error(transparent)]
    Rejected(BackendError),

    /// Every credential in the pool was tried and failed.
    #[error("all {attempts} API credentials are rate-limited or invalid")]
    AllCredentialsExhausted {
        /// Number of credentials tried.
        attempts: usize,
    },
}
