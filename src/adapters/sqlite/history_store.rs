//! SQLite implementation of HistoryStore.
//!
//! Two tables: `users` (language preference per identity) and
//! `conversation_history` (append-only turns per conversation key).
//! Timestamps are stored as fixed-width UTC text so lexical order matches
//! chronological order; ties fall back to the autoincrement id.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::{info, warn};

use crate::domain::conversation::{ConversationKey, Role, Turn};
use crate::domain::dispatch::Language;
use crate::domain::foundation::Timestamp;
use crate::ports::{HistoryError, HistoryStore};

const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        identity TEXT PRIMARY KEY,
        lang TEXT NOT NULL DEFAULT 'en'
    )
"#;

const CREATE_HISTORY: &str = r#"
    CREATE TABLE IF NOT EXISTS conversation_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        conversation_key TEXT NOT NULL,
        role TEXT NOT NULL,
        message TEXT NOT NULL,
        author_name TEXT,
        created_at TEXT NOT NULL
    )
"#;

const CREATE_HISTORY_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_conversation_history_key_created
    ON conversation_history (conversation_key, created_at)
"#;

/// SQLite-backed history store.
#[derive(Clone)]
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    /// Creates a store over an existing pool. The schema must already exist.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `url` and initializes the schema.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, HistoryError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| HistoryError::Database(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| HistoryError::Database(format!("Failed to open database: {}", e)))?;

        let store = Self::new(pool);
        store.init_schema().await?;

        info!(url, max_connections, "History store ready");
        Ok(store)
    }

    /// Creates tables and indexes if they do not exist.
    pub async fn init_schema(&self) -> Result<(), HistoryError> {
        for statement in [CREATE_USERS, CREATE_HISTORY, CREATE_HISTORY_INDEX] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    HistoryError::Database(format!("Failed to initialize schema: {}", e))
                })?;
        }
        Ok(())
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn format_timestamp(timestamp: &Timestamp) -> String {
    timestamp
        .as_datetime()
        .to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<Timestamp, HistoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Timestamp::from_datetime(dt.with_timezone(&Utc)))
        .map_err(|e| HistoryError::Corrupt(format!("created_at '{}': {}", raw, e)))
}

fn decode_turn(row: &SqliteRow) -> Result<Turn, HistoryError> {
    let column = |e: sqlx::Error| HistoryError::Corrupt(e.to_string());
    let role: String = row.try_get("role").map_err(column)?;
    let created_at: String = row.try_get("created_at").map_err(column)?;
    Ok(Turn {
        role: Role::from_str(&role).map_err(|e| HistoryError::Corrupt(e.to_string()))?,
        text: row.try_get("message").map_err(column)?,
        author_name: row.try_get("author_name").map_err(column)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn append(&self, key: &ConversationKey, turn: &Turn) -> Result<(), HistoryError> {
        sqlx::query(
            r#"
            INSERT INTO conversation_history (conversation_key, role, message, author_name, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(key.as_str())
        .bind(turn.role.as_str())
        .bind(&turn.text)
        .bind(turn.author_name.as_deref())
        .bind(format_timestamp(&turn.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| HistoryError::Database(format!("Failed to append turn: {}", e)))?;

        Ok(())
    }

    async fn recent(&self, key: &ConversationKey, limit: u32) -> Result<Vec<Turn>, HistoryError> {
        let rows = sqlx::query(
            r#"
            SELECT role, message, author_name, created_at
            FROM conversation_history
            WHERE conversation_key = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(key.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HistoryError::Database(format!("Failed to fetch history: {}", e)))?;

        let mut turns: Vec<Turn> = rows
            .iter()
            .filter_map(|row| match decode_turn(row) {
                Ok(turn) => Some(turn),
                Err(err) => {
                    warn!(key = %key, error = %err, "Skipping undecodable history row");
                    None
                }
            })
            .collect();

        turns.reverse();
        Ok(turns)
    }

    async fn delete_all(&self, key: &ConversationKey) -> Result<u64, HistoryError> {
        let result = sqlx::query("DELETE FROM conversation_history WHERE conversation_key = ?")
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| HistoryError::Database(format!("Failed to delete history: {}", e)))?;

        Ok(result.rows_affected())
    }

    async fn language(&self, identity: &str) -> Result<Option<Language>, HistoryError> {
        let row = sqlx::query("SELECT lang FROM users WHERE identity = ?")
            .bind(identity)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| HistoryError::Database(format!("Failed to fetch language: {}", e)))?;

        match row {
            Some(row) => {
                let code: String = row.get("lang");
                Language::from_str(&code)
                    .map(Some)
                    .map_err(|e| HistoryError::Corrupt(e.to_string()))
            }
            None => Ok(None),
        }
    }

    async fn set_language(&self, identity: &str, language: Language) -> Result<(), HistoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (identity, lang) VALUES (?, ?)
            ON CONFLICT(identity) DO UPDATE SET lang = excluded.lang
            "#,
        )
        .bind(identity)
        .bind(language.code())
        .execute(&self.pool)
        .await
        .map_err(|e| HistoryError::Database(format!("Failed to save language: {}", e)))?;

        Ok(())
    }
}
