//! JSON message catalog implementing the Localizer port.
//!
//! Catalogs are embedded in the binary via `include_str!`, one flat
//! `{"id": "text"}` object per language. Lookups fall back to English,
//! then to the message id itself.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::warn;

use crate::domain::dispatch::Language;
use crate::ports::{Localizer, MessageKey};

const EN_JSON: &str = include_str!("locales/en.json");
const ID_JSON: &str = include_str!("locales/id.json");

/// Parsed embedded catalogs, shared by every `JsonCatalog::embedded()` call.
static EMBEDDED: Lazy<Result<JsonCatalog, CatalogError>> =
    Lazy::new(|| JsonCatalog::from_sources(&[(Language::En, EN_JSON), (Language::Id, ID_JSON)]));

/// Errors loading a catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// A catalog source is not a flat JSON string map.
    #[error("invalid {language} catalog: {message}")]
    Parse { language: Language, message: String },
}

/// Localized strings keyed by language and message id.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    messages: HashMap<Language, HashMap<String, String>>,
}

impl JsonCatalog {
    /// The catalogs shipped with the binary.
    pub fn embedded() -> Result<Self, CatalogError> {
        EMBEDDED.clone()
    }

    /// Parses one JSON source per language.
    pub fn from_sources(sources: &[(Language, &str)]) -> Result<Self, CatalogError> {
        let mut messages = HashMap::new();
        for (language, source) in sources {
            let parsed: HashMap<String, String> =
                serde_json::from_str(source).map_err(|e| CatalogError::Parse {
                    language: *language,
                    message: e.to_string(),
                })?;
            messages.insert(*language, parsed);
        }
        Ok(Self { messages })
    }

    fn lookup(&self, language: Language, id: &str) -> Option<&str> {
        self.messages
            .get(&language)
            .and_then(|catalog| catalog.get(id))
            .map(String::as_str)
    }
}

impl Localizer for JsonCatalog {
    fn localize(&self, language: Language, key: MessageKey, args: &[(&str, &str)]) -> String {
        let id = key.id();
        let template = match self.lookup(language, id) {
            Some(template) => template,
            None => {
                warn!(%language, id, "Missing translation, falling back");
                self.lookup(Language::En, id).unwrap_or(id)
            }
        };

        args.iter().fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), value)
        })
    }
}
