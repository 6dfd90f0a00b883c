//! Inbound message shapes delivered by the messaging collaborator.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::{ChatRef, ConversationKey};

/// Opaque handle to downloadable media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Identifier the messenger uses to fetch the bytes.
    pub id: String,
    /// Declared MIME type.
    pub mime_type: String,
}

impl Attachment {
    /// Creates an attachment handle.
    pub fn new(id: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// The closed set of message shapes the relay reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Plain or extended text.
    Text { text: String },
    /// Image with optional caption.
    Image {
        attachment: Attachment,
        #[serde(default)]
        caption: String,
    },
    /// Document with optional caption.
    Document {
        attachment: Attachment,
        #[serde(default)]
        caption: String,
    },
    /// Anything else (stickers, reactions, receipts...). Always ignored.
    #[serde(other)]
    Other,
}

/// Who sent an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Stable sender identifier.
    pub id: String,
    /// Display name chosen by the sender, if known.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Sender {
    /// Creates a sender without a display name.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
        }
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Display name, falling back to the sender id.
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(self.id.as_str())
    }
}

/// One inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Chat the message arrived in.
    pub chat: ChatRef,
    /// Author of the message.
    pub sender: Sender,
    /// True when the bot's own account sent the message.
    #[serde(default)]
    pub from_me: bool,
    /// Message payload.
    pub message: InboundMessage,
}

impl InboundEvent {
    /// Creates an event from another participant.
    pub fn new(chat: ChatRef, sender: Sender, message: InboundMessage) -> Self {
        Self {
            chat,
            sender,
            from_me: false,
            message,
        }
    }

    /// Convenience constructor for a text event.
    pub fn text(chat: ChatRef, sender: Sender, text: impl Into<String>) -> Self {
        Self::new(chat, sender, InboundMessage::Text { text: text.into() })
    }

    /// Marks the event as sent by the bot itself.
    pub fn from_self(mut self) -> Self {
        self.from_me = true;
        self
    }

    /// Conversation key for this event.
    pub fn conversation_key(&self) -> ConversationKey {
        ConversationKey::for_chat(&self.chat, &self.sender.id)
    }

    /// Author name stored with user turns; only attached in group chats.
    pub fn author_name(&self) -> Option<String> {
        if self.chat.is_group() {
            Some(self.sender.name().to_string())
        } else {
            None
        }
    }
}
