//! SetLanguageHandler - `/lang <code>` command.

use std::sync::Arc;
use tracing::{error, info, warn};

use super::outcome::{CommandKind, DispatchOutcome, IgnoreReason};
use super::replies::ReplySender;
use crate::domain::conversation::ChatRef;
use crate::domain::dispatch::{Language, UnsupportedLanguage};
use crate::ports::{HistoryStore, Localizer, MessageKey};

/// Looks up the reply language for `identity`, defaulting to English.
pub async fn preferred_language(history: &dyn HistoryStore, identity: &str) -> Language {
    match history.language(identity).await {
        Ok(language) => language.unwrap_or_default(),
        Err(err) => {
            warn!(identity = %identity, error = %err, "Language lookup failed, using default");
            Language::default()
        }
    }
}

/// Command to change a sender's reply language.
#[derive(Debug, Clone)]
pub struct SetLanguageCommand {
    pub sender_id: String,
    /// Code as typed; `None` when the command had no argument.
    pub code: Option<String>,
}

/// Handler for `/lang`.
///
/// Replies go to the sender's direct chat, even when the command was sent
/// in a group.
pub struct SetLanguageHandler {
    history: Arc<dyn HistoryStore>,
    localizer: Arc<dyn Localizer>,
    replies: ReplySender,
}

impl SetLanguageHandler {
    pub fn new(
        history: Arc<dyn HistoryStore>,
        localizer: Arc<dyn Localizer>,
        replies: ReplySender,
    ) -> Self {
        Self {
            history,
            localizer,
            replies,
        }
    }

    pub async fn handle(&self, cmd: SetLanguageCommand) -> DispatchOutcome {
        let Some(code) = cmd.code else {
            info!(sender = %cmd.sender_id, "Language command without a code");
            return DispatchOutcome::Ignored(IgnoreReason::MissingLanguageCode);
        };
        let reply_to = ChatRef::direct(cmd.sender_id.clone());

        match code.parse::<Language>() {
            Err(UnsupportedLanguage(requested)) => {
                let current = preferred_language(self.history.as_ref(), &cmd.sender_id).await;
                let text = self.localizer.localize(
                    current,
                    MessageKey::LangNotFound,
                    &[("lang", requested.as_str())],
                );
                self.replies.text(&reply_to, &text).await;
            }
            Ok(language) => match self.history.set_language(&cmd.sender_id, language).await {
                Ok(()) => {
                    info!(sender = %cmd.sender_id, language = %language, "Language preference updated");
                    let text = self.localizer.localize(language, MessageKey::LangUpdated, &[]);
                    self.replies.text(&reply_to, &text).await;
                }
                Err(err) => {
                    error!(sender = %cmd.sender_id, error = %err, "Failed to store language preference");
                }
            },
        }

        DispatchOutcome::CommandHandled(CommandKind::Language)
    }
}
