//! Conversation keys and chat addressing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of chat an inbound message arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    /// One-to-one chat with the bot.
    Direct,
    /// Multi-participant group chat.
    Group,
}

/// Address of a chat; replies and presence updates go here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatRef {
    /// Chat identifier as understood by the messaging collaborator.
    pub id: String,
    /// Whether this is a direct or group chat.
    pub kind: ChatKind,
}

impl ChatRef {
    /// Creates a direct chat reference.
    pub fn direct(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ChatKind::Direct,
        }
    }

    /// Creates a group chat reference.
    pub fn group(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ChatKind::Group,
        }
    }

    /// Returns true for group chats.
    pub fn is_group(&self) -> bool {
        self.kind == ChatKind::Group
    }
}

impl fmt::Display for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Identity string that buckets history for one conversation thread.
///
/// Group chats share one key (the group id); direct chats are keyed by
/// the sender. History reads, writes and deletes for one event must all
/// use the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationKey(String);

impl ConversationKey {
    /// Resolves the key for a message.
    ///
    /// Pure function of its inputs: group chats resolve to the group id,
    /// everything else to the sender id.
    pub fn resolve(is_group: bool, group_id: &str, sender_id: &str) -> Self {
        if is_group {
            Self(group_id.to_string())
        } else {
            Self(sender_id.to_string())
        }
    }

    /// Resolves the key for a message sent by `sender_id` into `chat`.
    pub fn for_chat(chat: &ChatRef, sender_id: &str) -> Self {
        Self::resolve(chat.is_group(), &chat.id, sender_id)
    }

    /// Wraps an already-resolved key (e.g. read back from storage).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
