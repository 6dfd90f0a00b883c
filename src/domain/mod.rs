//! Domain layer containing relay rules and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (timestamps, validation errors)
//! - `conversation` - Conversation keys, turns, persona, and context windows
//! - `dispatch` - Inbound message shapes, commands, triggers, languages

pub mod conversation;
pub mod dispatch;
pub mod foundation;
