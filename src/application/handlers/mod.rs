//! Application handlers.
//!
//! The dispatcher classifies inbound events and hands them to one of the
//! command or query handlers below.

mod dispatcher;
mod language;
mod outcome;
mod query;
mod replies;
mod reset;
mod store_info;

pub use dispatcher::{classify, Dispatcher, DispatcherConfig, Route, UNSUPPORTED_DOCUMENT_NOTICE};
pub use language::{preferred_language, SetLanguageCommand, SetLanguageHandler};
pub use outcome::{CommandKind, DispatchOutcome, IgnoreReason, QueryKind};
pub use query::{QueryCommand, QueryHandler, QueryInput, DEFAULT_DOCUMENT_PROMPT};
pub use replies::{ReplySender, DEFAULT_SEND_TIMEOUT};
pub use reset::{ResetConversationCommand, ResetConversationHandler};
pub use store_info::{
    StoreInfo, StoreInfoHandler, StoreLocation, LOCATION_NOT_CONFIGURED, MENU_CAPTION,
    MENU_NOT_CONFIGURED, MENU_READ_FAILED,
};
