//! Application layer - Dispatcher, handlers, and context assembly.
//!
//! This layer orchestrates domain rules and coordinates between ports.
//! Commands (`/lang`, `/reset`, store info) never reach the model; queries
//! always go through the credential-rotating client.

mod context_assembler;
pub mod handlers;
mod intake;

pub use context_assembler::ContextAssembler;
pub use intake::run_event_loop;
pub use handlers::{
    classify, CommandKind, DispatchOutcome, Dispatcher, DispatcherConfig, IgnoreReason,
    QueryKind, Route, StoreInfo, StoreLocation,
};
