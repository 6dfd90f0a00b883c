//! Persona file loading.

mod yaml_loader;

pub use yaml_loader::{load_persona, read_persona, PersonaLoadError};
