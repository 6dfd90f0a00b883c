//! History store port.
//!
//! Append-only record of conversation turns plus per-identity language
//! preference.
//!
//! # Design
//!
//! - **Key-scoped**: every operation is scoped by a conversation key or identity
//! - **Append-only**: turns are never updated, only appended or bulk-deleted
//! - **Window reads**: `recent` selects newest-first, returns oldest-first

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversation::{ConversationKey, Turn};
use crate::domain::dispatch::Language;

/// Errors raised by history storage.
#[derive(Debug, Clone, Error)]
pub enum HistoryError {
    /// Underlying database failure.
    #[error("Database error: {0}")]
    Database(String),

    /// A stored row could not be decoded.
    #[error("Corrupt history row: {0}")]
    Corrupt(String),
}

/// Port for conversation history persistence.
///
/// Implementations must ensure:
/// - `recent` returns at most `limit` turns, ordered oldest to newest
/// - Ties on creation time are broken by insertion order
/// - `delete_all` removes every turn for the key and nothing else
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append one turn under the key.
    async fn append(&self, key: &ConversationKey, turn: &Turn) -> Result<(), HistoryError>;

    /// The most recent `limit` turns for the key, oldest first.
    async fn recent(&self, key: &ConversationKey, limit: u32) -> Result<Vec<Turn>, HistoryError>;

    /// Delete all turns for the key, returning how many were removed.
    async fn delete_all(&self, key: &ConversationKey) -> Result<u64, HistoryError>;

    /// Stored language preference for an identity, if any.
    async fn language(&self, identity: &str) -> Result<Option<Language>, HistoryError>;

    /// Persist the language preference for an identity.
    async fn set_language(&self, identity: &str, language: Language) -> Result<(), HistoryError>;
}
