//! In-memory adapters for tests and local runs.

mod history_store;

pub use history_store::InMemoryHistoryStore;
