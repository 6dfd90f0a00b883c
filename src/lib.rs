//! Gemini Relay - chat relay answering messages through a Gemini model
//!
//! Inbound chat events are classified by the [`application::Dispatcher`],
//! answered through a [`adapters::ai::CredentialRotatingClient`] that rotates
//! across a pool of API keys, and remembered per conversation in a sliding
//! window of stored turns.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
