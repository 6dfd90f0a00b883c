//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the relay core and the outside world. Adapters implement these ports.
//!
//! - `GenerativeBackend` - One model call with one credential
//! - `HistoryStore` - Conversation history and language preferences
//! - `Messenger` - Replies, presence, and media download
//! - `Localizer` - Localized user-facing strings

mod generative_backend;
mod history_store;
mod localizer;
mod messenger;

pub use generative_backend::{
    BackendError, BackendInfo, Generation, GenerationError, GenerationRequest, GenerativeBackend,
    InlineAttachment,
};
pub use history_store::{HistoryError, HistoryStore};
pub use localizer::{Localizer, MessageKey};
pub use messenger::{Messenger, MessengerError, OutboundImage, Presence};
