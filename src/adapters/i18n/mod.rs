//! Localization adapters.

mod catalog;

pub use catalog::{CatalogError, JsonCatalog};
