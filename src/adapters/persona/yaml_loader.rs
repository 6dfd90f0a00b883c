//! Loads persona text from a YAML file with a top-level `knowledge:` key.
//!
//! Every failure degrades to "no persona" with a log line; a bad persona
//! file never prevents startup.

use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

use crate::domain::conversation::Persona;

#[derive(Debug, Deserialize)]
struct KnowledgeFile {
    #[serde(default)]
    knowledge: String,
}

/// Errors reading a persona file.
#[derive(Debug, thiserror::Error)]
pub enum PersonaLoadError {
    #[error("could not read persona file: {0}")]
    Io(String),

    #[error("could not parse persona YAML: {0}")]
    Parse(String),
}

/// Reads and parses the file; `Ok(None)` when the knowledge text is blank.
pub async fn read_persona(path: &Path) -> Result<Option<Persona>, PersonaLoadError> {
    let yaml = fs::read_to_string(path)
        .await
        .map_err(|e| PersonaLoadError::Io(e.to_string()))?;

    let parsed: KnowledgeFile =
        serde_yaml::from_str(&yaml).map_err(|e| PersonaLoadError::Parse(e.to_string()))?;

    Ok(Persona::new(parsed.knowledge))
}

/// Loads the persona when enabled, logging and absorbing every failure.
pub async fn load_persona(enabled: bool, path: Option<&Path>) -> Option<Persona> {
    if !enabled {
        info!("Persona injection disabled");
        return None;
    }

    let Some(path) = path else {
        warn!("Persona enabled but no file configured, skipping");
        return None;
    };

    match read_persona(path).await {
        Ok(Some(persona)) => {
            info!(path = %path.display(), chars = persona.text().len(), "Persona loaded");
            Some(persona)
        }
        Ok(None) => {
            warn!(path = %path.display(), "Persona file has no knowledge text");
            None
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Persona unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn loads_knowledge_text() {
        let file = yaml_file("knowledge: |\n  You are a barista at {{user_name}}'s favourite cafe.\n");

        let persona = load_persona(true, Some(file.path())).await.unwrap();

        assert!(persona.text().starts_with("You are a barista"));
        assert!(persona.text().contains("{{user_name}}"));
    }

    #[tokio::test]
    async fn disabled_skips_file() {
        let file = yaml_file("knowledge: hello");
        assert!(load_persona(false, Some(file.path())).await.is_none());
    }

    #[tokio::test]
    async fn missing_path_or_file_is_none() {
        assert!(load_persona(true, None).await.is_none());
        assert!(load_persona(true, Some(Path::new("/nonexistent/persona.yaml")))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn bad_yaml_is_none() {
        let file = yaml_file("knowledge: [unclosed");

        assert!(matches!(
            read_persona(file.path()).await,
            Err(PersonaLoadError::Parse(_))
        ));
        assert!(load_persona(true, Some(file.path())).await.is_none());
    }

    #[tokio::test]
    async fn missing_or_blank_key_is_none() {
        let other = yaml_file("something_else: 1\n");
        assert!(read_persona(other.path()).await.unwrap().is_none());

        let blank = yaml_file("knowledge: \"   \"\n");
        assert!(read_persona(blank.path()).await.unwrap().is_none());
    }
}
