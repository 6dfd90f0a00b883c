//! Conversation module - history, keys, and context assembly.
//!
//! - `key` - Conversation key resolution and chat addressing
//! - `turn` - Immutable stored turns
//! - `context` - Sliding-window context for a single generation request
//! - `persona` - Persona/knowledge text wrapping

mod context;
mod key;
mod persona;
mod turn;

pub use context::{ConversationContext, PromptTurn, HISTORY_WINDOW};
pub use key::{ChatKind, ChatRef, ConversationKey};
pub use persona::{
    image_prompt, Persona, DEFAULT_IMAGE_CAPTION, IMAGE_ANALYSIS_INSTRUCTION, USER_NAME_PLACEHOLDER,
};
pub use turn::{Role, Turn};
