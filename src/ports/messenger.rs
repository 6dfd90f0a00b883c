//! Messenger port - the slice of the messaging protocol the relay needs.
//!
//! Connection management, pairing and transport belong to the adapter;
//! the relay only sends replies, toggles presence, and downloads media.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::conversation::ChatRef;
use crate::domain::dispatch::Attachment;

/// Chat presence shown to participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// "typing..." indicator.
    Composing,
    /// Indicator cleared.
    Paused,
}

/// Image to send to a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundImage {
    /// Encoded image bytes.
    pub data: Vec<u8>,
    /// MIME type of `data`.
    pub mime_type: String,
    /// Caption shown under the image.
    pub caption: String,
}

/// Errors raised by the messaging collaborator.
#[derive(Debug, Clone, Error)]
pub enum MessengerError {
    /// Media could not be fetched.
    #[error("download failed: {0}")]
    Download(String),

    /// A message could not be delivered.
    #[error("send failed: {0}")]
    Send(String),

    /// The send did not complete within the per-send timeout.
    #[error("send timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },
}

/// Port for outbound messaging.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a text message.
    async fn send_text(&self, chat: &ChatRef, text: &str) -> Result<(), MessengerError>;

    /// Upload and send an image.
    async fn send_image(&self, chat: &ChatRef, image: OutboundImage) -> Result<(), MessengerError>;

    /// Send a location pin.
    async fn send_location(
        &self,
        chat: &ChatRef,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), MessengerError>;

    /// Update chat presence. Best-effort.
    async fn set_presence(&self, chat: &ChatRef, presence: Presence) -> Result<(), MessengerError>;

    /// Download the bytes behind an attachment.
    async fn download(&self, attachment: &Attachment) -> Result<Vec<u8>, MessengerError>;
}
