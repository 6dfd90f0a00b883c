//! Persona configuration

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Persona/knowledge injection settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonaConfig {
    /// Wrap prompts with the persona text
    #[serde(default)]
    pub enabled: bool,

    /// YAML file with a `knowledge:` string
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl PersonaConfig {
    /// Persona file path, if one is set and non-empty.
    pub fn file(&self) -> Option<&Path> {
        self.file
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }
}
