//! In-Memory History Store Adapter
//!
//! Keeps turns and language preferences in memory.
//! Useful for testing and development. Failure injection lets tests
//! exercise the degraded paths without a database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{ConversationKey, Turn};
use crate::domain::dispatch::Language;
use crate::ports::{HistoryError, HistoryStore};

/// In-memory history store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStore {
    turns: Arc<RwLock<HashMap<ConversationKey, Vec<Turn>>>>,
    languages: Arc<RwLock<HashMap<String, Language>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryHistoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read (`recent`, `language`) fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write (`append`, `delete_all`, `set_language`) fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// All turns stored under a key, in insertion order.
    pub async fn all(&self, key: &ConversationKey) -> Vec<Turn> {
        self.turns
            .read()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of stored turns across keys.
    pub async fn turn_count(&self) -> usize {
        self.turns.read().await.values().map(Vec::len).sum()
    }

    fn check_read(&self) -> Result<(), HistoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(HistoryError::Database("injected read failure".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), HistoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(HistoryError::Database("injected write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, key: &ConversationKey, turn: &Turn) -> Result<(), HistoryError> {
        self.check_write()?;
        let mut turns = self.turns.write().await;
        turns.entry(key.clone()).or_default().push(turn.clone());
        Ok(())
    }

    async fn recent(&self, key: &ConversationKey, limit: u32) -> Result<Vec<Turn>, HistoryError> {
        self.check_read()?;
        let turns = self.turns.read().await;
        let mut stored = turns.get(key).cloned().unwrap_or_default();

        // Stable sort keeps insertion order for equal timestamps.
        stored.sort_by_key(|turn| turn.created_at);
        let skip = stored.len().saturating_sub(limit as usize);
        Ok(stored.into_iter().skip(skip).collect())
    }

    async fn delete_all(&self, key: &ConversationKey) -> Result<u64, HistoryError> {
        self.check_write()?;
        let removed = self.turns.write().await.remove(key);
        Ok(removed.map(|turns| turns.len() as u64).unwrap_or(0))
    }

    async fn language(&self, identity: &str) -> Result<Option<Language>, HistoryError> {
        self.check_read()?;
        Ok(self.languages.read().await.get(identity).copied())
    }

    async fn set_language(&self, identity: &str, language: Language) -> Result<(), HistoryError> {
        self.check_write()?;
        self.languages
            .write()
            .await
            .insert(identity.to_string(), language);
        Ok(())
    }
}
