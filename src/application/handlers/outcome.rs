//! Terminal states of one dispatched event.

use serde::Serialize;

/// Why an event produced no action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Sent by the bot's own account.
    FromSelf,
    /// Sticker, reaction, or another shape the relay does not handle.
    UnsupportedMessage,
    /// Text message with nothing but whitespace.
    EmptyText,
    /// Group message that does not start with a trigger token.
    MissingTrigger,
    /// Trigger token with nothing after it.
    EmptyPrompt,
    /// `/lang` without a language code.
    MissingLanguageCode,
}

/// Which command ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Language,
    Reset,
    Location,
    Menu,
}

/// Which query path ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Text,
    Image,
    Document,
}

/// Result of dispatching one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Nothing was sent, stored, or generated.
    Ignored(IgnoreReason),
    /// A command ran without calling the model.
    CommandHandled(CommandKind),
    /// The model answered and the reply was sent.
    QueryHandled(QueryKind),
    /// The model call failed; a localized error was sent.
    QueryFailed(QueryKind),
    /// Document type the relay cannot process; a notice was sent.
    Unsupported,
    /// Attachment bytes could not be fetched; nothing was sent.
    DownloadFailed(QueryKind),
}

impl DispatchOutcome {
    /// True when the event was ignored for any reason.
    pub fn is_ignored(&self) -> bool {
        matches!(self, DispatchOutcome::Ignored(_))
    }
}
