//! Gemini REST adapter.

mod backend;
mod wire;

pub use backend::{GeminiBackend, GeminiConfig, DEFAULT_BASE_URL};
