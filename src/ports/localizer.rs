//! Localizer port - string catalog lookup.

use serde::{Deserialize, Serialize};

use crate::domain::dispatch::Language;

/// Identifiers of localized user-facing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    /// Generic "the model failed" reply.
    ErrorGemini,
    /// Unknown language code; takes `lang`.
    LangNotFound,
    /// Language preference saved.
    LangUpdated,
    /// History cleared.
    ResetSuccess,
    /// History could not be cleared.
    ResetFailed,
}

impl MessageKey {
    /// Catalog identifier.
    pub fn id(&self) -> &'static str {
        match self {
            MessageKey::ErrorGemini => "error_gemini",
            MessageKey::LangNotFound => "lang_not_found",
            MessageKey::LangUpdated => "lang_updated",
            MessageKey::ResetSuccess => "reset_success",
            MessageKey::ResetFailed => "reset_failed",
        }
    }
}

/// Port for localized strings.
pub trait Localizer: Send + Sync {
    /// Renders `key` in `language`, substituting `{name}` placeholders from `args`.
    fn localize(&self, language: Language, key: MessageKey, args: &[(&str, &str)]) -> String;
}
