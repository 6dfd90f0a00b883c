//! Adapters - Implementations of port interfaces.
//!
//! - `ai` - Credential pool, rotating client, mock backend
//! - `gemini` - Gemini REST backend
//! - `sqlite` - SQLite history store
//! - `memory` - In-memory history store
//! - `i18n` - Embedded message catalogs
//! - `persona` - Persona file loading
//! - `messaging` - JSON-lines and recording messengers

pub mod ai;
pub mod gemini;
pub mod i18n;
pub mod memory;
pub mod messaging;
pub mod persona;
pub mod sqlite;
