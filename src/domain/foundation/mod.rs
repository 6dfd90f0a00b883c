//! Foundation module - Shared domain primitives.
//!
//! Contains value objects and error types that form the vocabulary
//! of the relay domain.

mod errors;
mod timestamp;

pub use errors::ValidationError;
pub use timestamp::Timestamp;
