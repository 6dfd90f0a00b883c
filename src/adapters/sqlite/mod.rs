//! SQLite adapters.

mod history_store;

pub use history_store::SqliteHistoryStore;
