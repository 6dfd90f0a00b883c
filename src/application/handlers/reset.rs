//! ResetConversationHandler - `/reset` and `/newchat`.

use std::sync::Arc;
use tracing::{error, info};

use super::language::preferred_language;
use super::outcome::{CommandKind, DispatchOutcome};
use super::replies::ReplySender;
use crate::domain::conversation::{ChatRef, ConversationKey};
use crate::ports::{HistoryStore, Localizer, MessageKey};

/// Command to clear a conversation's history.
#[derive(Debug, Clone)]
pub struct ResetConversationCommand {
    pub chat: ChatRef,
    pub sender_id: String,
    pub key: ConversationKey,
}

/// Handler for the reset commands.
pub struct ResetConversationHandler {
    history: Arc<dyn HistoryStore>,
    localizer: Arc<dyn Localizer>,
    replies: ReplySender,
}

impl ResetConversationHandler {
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

    pub async fn handle(&self, cmd: ResetConversationCommand) -> DispatchOutcome {
        let message = match self.history.delete_all(&cmd.key).await {
            Ok(removed) => {
                info!(key = %cmd.key, removed, "Conversation history cleared");
                MessageKey::ResetSuccess
            }
            Err(err) => {
                error!(key = %cmd.key, error = %err, "Failed to clear conversation history");
                MessageKey::ResetFailed
            }
        };

        let language = preferred_language(self.history.as_ref(), &cmd.sender_id).await;
        let text = self.localizer.localize(language, message, &[]);
        self.replies.text(&cmd.chat, &text).await;

        DispatchOutcome::CommandHandled(CommandKind::Reset)
    }
}
