//! Dispatch module - inbound shapes and message classification rules.

mod command;
mod inbound;
mod language;

pub use command::{
    parse_command, strip_trigger, Command, LANG_COMMAND, LOCATION_COMMAND, MENU_COMMAND,
    RESET_COMMANDS, TRIGGER_TOKENS,
};
pub use inbound::{Attachment, InboundEvent, InboundMessage, Sender};
pub use language::{Language, UnsupportedLanguage};

/// Document MIME types the relay can forward to the model.
pub const SUPPORTED_DOCUMENT_TYPES: [&str; 1] = ["application/pdf"];

/// Returns true if a document with this MIME type can be processed.
pub fn is_supported_document(mime_type: &str) -> bool {
    SUPPORTED_DOCUMENT_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(mime_type.trim()))
}
