//! JSON-lines messenger.
//!
//! Inbound events arrive one JSON object per line; replies and presence
//! updates are written back as JSON lines on the output stream. Attachments
//! are resolved as files inside a media directory, named by attachment id.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::domain::conversation::ChatRef;
use crate::domain::dispatch::{Attachment, InboundEvent};
use crate::ports::{Messenger, MessengerError, OutboundImage, Presence};

/// One outbound line.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutboundFrame<'a> {
    Text {
        chat: &'a ChatRef,
        text: &'a str,
    },
    Image {
        chat: &'a ChatRef,
        mime_type: &'a str,
        caption: &'a str,
        data: String,
    },
    Location {
        chat: &'a ChatRef,
        latitude: f64,
        longitude: f64,
    },
    Presence {
        chat: &'a ChatRef,
        presence: Presence,
    },
}

/// Parses one inbound line.
pub fn parse_event_line(line: &str) -> Result<InboundEvent, serde_json::Error> {
    serde_json::from_str(line)
}

/// Messenger writing JSON lines to any async writer.
pub struct StdioMessenger<W> {
    writer: Arc<Mutex<W>>,
    media_dir: PathBuf,
}

impl<W: AsyncWrite + Unpin + Send> StdioMessenger<W> {
    /// Creates a messenger; attachments are read from the current directory.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
            media_dir: PathBuf::from("."),
        }
    }

    /// Sets the directory attachments are resolved in.
    pub fn with_media_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.media_dir = dir.into();
        self
    }

    async fn write_frame(&self, frame: &OutboundFrame<'_>) -> Result<(), MessengerError> {
        let mut line =
            serde_json::to_vec(frame).map_err(|e| MessengerError::Send(e.to_string()))?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&line)
            .await
            .map_err(|e| MessengerError::Send(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| MessengerError::Send(e.to_string()))
    }

    fn media_path(&self, attachment: &Attachment) -> Result<PathBuf, MessengerError> {
        let id = attachment.id.as_str();
        if id.is_empty() || id.contains(|c: char| c == '/' || c == '\\') || id.contains("..") {
            return Err(MessengerError::Download(format!(
                "invalid attachment id '{}'",
                id
            )));
        }
        Ok(self.media_dir.join(id))
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Messenger for StdioMessenger<W> {
    async fn send_text(&self, chat: &ChatRef, text: &str) -> Result<(), MessengerError> {
        self.write_frame(&OutboundFrame::Text { chat, text }).await
    }

    async fn send_image(&self, chat: &ChatRef, image: OutboundImage) -> Result<(), MessengerError> {
        self.write_frame(&OutboundFrame::Image {
            chat,
            mime_type: &image.mime_type,
            caption: &image.caption,
            data: BASE64_STANDARD.encode(&image.data),
        })
        .await
    }

    async fn send_location(
        &self,
        chat: &ChatRef,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), MessengerError> {
        self.write_frame(&OutboundFrame::Location {
            chat,
            latitude,
            longitude,
        })
        .await
    }

    async fn set_presence(&self, chat: &ChatRef, presence: Presence) -> Result<(), MessengerError> {
        self.write_frame(&OutboundFrame::Presence { chat, presence })
            .await
    }

    async fn download(&self, attachment: &Attachment) -> Result<Vec<u8>, MessengerError> {
        let path = self.media_path(attachment)?;
        fs::read(&path)
            .await
            .map_err(|e| MessengerError::Download(format!("{}: {}", path.display(), e)))
    }
}
