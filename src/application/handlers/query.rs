//! QueryHandler - text, image, and document queries against the model.
//!
//! Every path runs inside a composing presence, replies in the origin
//! chat, and stores the exchange under the event's conversation key only
//! when the model produced content.

use std::sync::Arc;
use tracing::{error, info, warn};

use super::language::preferred_language;
use super::outcome::{DispatchOutcome, QueryKind};
use super::replies::ReplySender;
use crate::adapters::ai::{CredentialRotatingClient, ModelReply};
use crate::application::ContextAssembler;
use crate::domain::conversation::{image_prompt, ChatRef, ConversationKey, Turn};
use crate::domain::dispatch::{Attachment, InboundEvent};
use crate::ports::{GenerationError, HistoryStore, Localizer, MessageKey};

/// Prompt used when a document arrives without caption text.
pub const DEFAULT_DOCUMENT_PROMPT: &str = "Please summarize this document.";

const IMAGE_TURN_PREFIX: &str = "[User sent an image]";
const DOCUMENT_TURN_PREFIX: &str = "[User sent a PDF]";

/// What the user asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryInput {
    /// Free text, trigger already stripped.
    Text { prompt: String },
    /// Image with its raw caption.
    Image {
        attachment: Attachment,
        caption: String,
    },
    /// Supported document with its effective prompt.
    Document {
        attachment: Attachment,
        prompt: String,
    },
}

impl QueryInput {
    pub fn kind(&self) -> QueryKind {
        match self {
            QueryInput::Text { .. } => QueryKind::Text,
            QueryInput::Image { .. } => QueryKind::Image,
            QueryInput::Document { .. } => QueryKind::Document,
        }
    }
}

/// Command to answer one query.
#[derive(Debug, Clone)]
pub struct QueryCommand {
    pub chat: ChatRef,
    pub sender_id: String,
    pub key: ConversationKey,
    /// Attached to stored user turns; set only in group chats.
    pub author_name: Option<String>,
    pub input: QueryInput,
}

impl QueryCommand {
    /// Builds a command, resolving the key and author from the event.
    pub fn from_event(event: &InboundEvent, input: QueryInput) -> Self {
        Self {
            chat: event.chat.clone(),
            sender_id: event.sender.id.clone(),
            key: event.conversation_key(),
            author_name: event.author_name(),
            input,
        }
    }
}

/// Handler for model queries.
pub struct QueryHandler {
    client: Arc<CredentialRotatingClient>,
    assembler: ContextAssembler,
    history: Arc<dyn HistoryStore>,
    localizer: Arc<dyn Localizer>,
    replies: ReplySender,
}

impl QueryHandler {
    pub fn new(
        client: Arc<CredentialRotatingClient>,
        assembler: ContextAssembler,
        history: Arc<dyn HistoryStore>,
        localizer: Arc<dyn Localizer>,
        replies: ReplySender,
    ) -> Self {
        Self {
            client,
            assembler,
            history,
            localizer,
            replies,
        }
    }

    pub async fn handle(&self, cmd: QueryCommand) -> DispatchOutcome {
        let chat = cmd.chat.clone();
        self.replies.while_composing(&chat, self.answer(cmd)).await
    }

    async fn answer(&self, cmd: QueryCommand) -> DispatchOutcome {
        let kind = cmd.input.kind();
        let author = cmd.author_name.as_deref();

        let (user_turn, result) = match &cmd.input {
            QueryInput::Text { prompt } => {
                let user_turn = Turn::user(prompt.as_str(), cmd.author_name.clone());
                let context = self.assembler.assemble(&cmd.key, prompt, author).await;
                (user_turn, self.client.generate(context.turns()).await)
            }
            QueryInput::Image {
                attachment,
                caption,
            } => {
                let Some(data) = self.fetch(&cmd, attachment).await else {
                    return DispatchOutcome::DownloadFailed(kind);
                };
                let user_turn = Turn::user(
                    format!("{} {}", IMAGE_TURN_PREFIX, caption).trim(),
                    cmd.author_name.clone(),
                );
                let prompt = image_prompt(caption, self.assembler.persona(), author);
                let result = self
                    .client
                    .generate_with_attachment(&prompt, &attachment.mime_type, data)
                    .await;
                (user_turn, result)
            }
            QueryInput::Document { attachment, prompt } => {
                let Some(data) = self.fetch(&cmd, attachment).await else {
                    return DispatchOutcome::DownloadFailed(kind);
                };
                let user_turn = Turn::user(
                    format!("{} {}", DOCUMENT_TURN_PREFIX, prompt).trim(),
                    cmd.author_name.clone(),
                );
                let result = self
                    .client
                    .generate_with_attachment(prompt, &attachment.mime_type, data)
                    .await;
                (user_turn, result)
            }
        };

        self.finish(&cmd, kind, user_turn, result).await
    }

    async fn fetch(&self, cmd: &QueryCommand, attachment: &Attachment) -> Option<Vec<u8>> {
        match self.replies.download(attachment).await {
            Ok(data) => Some(data),
            Err(err) => {
                warn!(key = %cmd.key, attachment = %attachment.id, error = %err, "Attachment download failed");
                None
            }
        }
    }

    async fn finish(
        &self,
        cmd: &QueryCommand,
        kind: QueryKind,
        user_turn: Turn,
        result: Result<ModelReply, GenerationError>,
    ) -> DispatchOutcome {
        match result {
            Ok(reply) => {
                self.replies.text(&cmd.chat, reply.as_text()).await;
                match reply {
                    ModelReply::Text(text) => {
                        self.record(&cmd.key, &user_turn).await;
                        self.record(&cmd.key, &Turn::model(text)).await;
                    }
                    ModelReply::Empty => {
                        info!(key = %cmd.key, ?kind, "Model returned no content, exchange not stored");
                    }
                }
                DispatchOutcome::QueryHandled(kind)
            }
            Err(err) => {
                error!(key = %cmd.key, ?kind, error = %err, "Generation failed");
                let language = preferred_language(self.history.as_ref(), &cmd.sender_id).await;
                let text = self.localizer.localize(language, MessageKey::ErrorGemini, &[]);
                self.replies.text(&cmd.chat, &text).await;
                DispatchOutcome::QueryFailed(kind)
            }
        }
    }

    async fn record(&self, key: &ConversationKey, turn: &Turn) {
        if !turn.is_persistable() {
            return;
        }
        if let Err(err) = self.history.append(key, turn).await {
            warn!(key = %key, role = %turn.role, error = %err, "Failed to store turn");
        }
    }
}
