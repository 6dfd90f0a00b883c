//! Dispatcher - classifies one inbound event and runs the matching handler.
//!
//! Classification is a pure function over the event; the first matching
//! rule wins:
//!
//! 1. Own messages are ignored.
//! 2. Images go to the image query.
//! 3. Documents with an unsupported type get a notice.
//! 4. Supported documents in direct chats, or with a trigger in groups, go
//!    to the document query.
//! 5. `/lang`, then the reset commands, then the store commands.
//! 6. Remaining text is a query: the whole text in direct chats, the text
//!    after a trigger token in groups.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::language::{SetLanguageCommand, SetLanguageHandler};
use super::outcome::{DispatchOutcome, IgnoreReason};
use super::query::{QueryCommand, QueryHandler, QueryInput, DEFAULT_DOCUMENT_PROMPT};
use super::replies::{ReplySender, DEFAULT_SEND_TIMEOUT};
use super::reset::{ResetConversationCommand, ResetConversationHandler};
use super::store_info::{StoreInfo, StoreInfoHandler};
use crate::adapters::ai::CredentialRotatingClient;
use crate::application::ContextAssembler;
use crate::domain::conversation::Persona;
use crate::domain::dispatch::{
    is_supported_document, parse_command, strip_trigger, Attachment, Command, InboundEvent,
    InboundMessage,
};
use crate::ports::{HistoryStore, Localizer, Messenger};

/// Notice sent for documents the model cannot read.
pub const UNSUPPORTED_DOCUMENT_NOTICE: &str =
    "Sorry, I can only process PDF documents at the moment.";

/// Where an event is routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'a> {
    Ignore(IgnoreReason),
    Query(QueryInput),
    UnsupportedDocument,
    Language(Option<&'a str>),
    Reset,
    Location,
    Menu,
}

/// Classifies an event without side effects.
pub fn classify(event: &InboundEvent) -> Route<'_> {
    if event.from_me {
        return Route::Ignore(IgnoreReason::FromSelf);
    }

    match &event.message {
        InboundMessage::Image {
            attachment,
            caption,
        } => Route::Query(QueryInput::Image {
            attachment: attachment.clone(),
            caption: caption.clone(),
        }),
        InboundMessage::Document {
            attachment,
            caption,
        } => classify_document(event, attachment, caption),
        InboundMessage::Text { text } => classify_text(event, text),
        InboundMessage::Other => Route::Ignore(IgnoreReason::UnsupportedMessage),
    }
}

fn classify_document<'a>(event: &InboundEvent, attachment: &Attachment, caption: &'a str) -> Route<'a> {
    if !is_supported_document(&attachment.mime_type) {
        return Route::UnsupportedDocument;
    }

    let prompt = match strip_trigger(caption) {
        Some(rest) => rest,
        None if !event.chat.is_group() => caption.trim(),
        None => return Route::Ignore(IgnoreReason::MissingTrigger),
    };
    let prompt = if prompt.is_empty() {
        DEFAULT_DOCUMENT_PROMPT
    } else {
        prompt
    };

    Route::Query(QueryInput::Document {
        attachment: attachment.clone(),
        prompt: prompt.to_string(),
    })
}

fn classify_text<'a>(event: &InboundEvent, text: &'a str) -> Route<'a> {
    let text = text.trim();
    if text.is_empty() {
        return Route::Ignore(IgnoreReason::EmptyText);
    }

    match parse_command(text) {
        Some(Command::Language(code)) => return Route::Language(code),
        Some(Command::Reset) => return Route::Reset,
        Some(Command::Location) => return Route::Location,
        Some(Command::Menu) => return Route::Menu,
        None => {}
    }

    let prompt = if event.chat.is_group() {
        match strip_trigger(text) {
            Some("") => return Route::Ignore(IgnoreReason::EmptyPrompt),
            Some(rest) => rest,
            None => return Route::Ignore(IgnoreReason::MissingTrigger),
        }
    } else {
        text
    };

    Route::Query(QueryInput::Text {
        prompt: prompt.to_string(),
    })
}

/// Optional dispatcher settings.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub persona: Option<Persona>,
    pub send_timeout: Duration,
    pub store: StoreInfo,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            persona: None,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            store: StoreInfo::default(),
        }
    }
}

/// Routes inbound events to handlers.
///
/// Safe to share across tasks; the only cross-event serialization is the
/// credential pool inside the client.
pub struct Dispatcher {
    queries: QueryHandler,
    language: SetLanguageHandler,
    reset: ResetConversationHandler,
    store_info: StoreInfoHandler,
    replies: ReplySender,
}

impl Dispatcher {
    pub fn new(
        client: Arc<CredentialRotatingClient>,
        history: Arc<dyn HistoryStore>,
        messenger: Arc<dyn Messenger>,
        localizer: Arc<dyn Localizer>,
        config: DispatcherConfig,
    ) -> Self {
        let replies = ReplySender::new(messenger, config.send_timeout);
        let assembler = ContextAssembler::new(history.clone(), config.persona);

        Self {
            queries: QueryHandler::new(
                client,
                assembler,
                history.clone(),
                localizer.clone(),
                replies.clone(),
            ),
            language: SetLanguageHandler::new(history.clone(), localizer.clone(), replies.clone()),
            reset: ResetConversationHandler::new(history, localizer, replies.clone()),
            store_info: StoreInfoHandler::new(config.store, replies.clone()),
            replies,
        }
    }

    /// Handles one event to completion.
    pub async fn dispatch(&self, event: &InboundEvent) -> DispatchOutcome {
        let outcome = match classify(event) {
            Route::Ignore(reason) => {
                debug!(chat = %event.chat, sender = %event.sender.id, ?reason, "Event ignored");
                DispatchOutcome::Ignored(reason)
            }
            Route::UnsupportedDocument => {
                self.replies
                    .text(&event.chat, UNSUPPORTED_DOCUMENT_NOTICE)
                    .await;
                DispatchOutcome::Unsupported
            }
            Route::Language(code) => {
                self.language
                    .handle(SetLanguageCommand {
                        sender_id: event.sender.id.clone(),
                        code: code.map(str::to_string),
                    })
                    .await
            }
            Route::Reset => {
                self.reset
                    .handle(ResetConversationCommand {
                        chat: event.chat.clone(),
                        sender_id: event.sender.id.clone(),
                        key: event.conversation_key(),
                    })
                    .await
            }
            Route::Location => self.store_info.send_location(&event.chat).await,
            Route::Menu => self.store_info.send_menu(&event.chat).await,
            Route::Query(input) => {
                self.queries
                    .handle(QueryCommand::from_event(event, input))
                    .await
            }
        };

        if !outcome.is_ignored() {
            info!(chat = %event.chat, sender = %event.sender.id, ?outcome, "Event handled");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::ChatRef;
    use crate::domain::dispatch::Sender;

    fn direct(text: &str) -> InboundEvent {
        InboundEvent::text(ChatRef::direct("U1"), Sender::new("U1"), text)
    }

    fn group(text: &str) -> InboundEvent {
        InboundEvent::text(ChatRef::group("G1"), Sender::new("U2"), text)
    }

    fn document(chat: ChatRef, mime_type: &str, caption: &str) -> InboundEvent {
        InboundEvent::new(
            chat,
            Sender::new("U2"),
            InboundMessage::Document {
                attachment: Attachment::new("doc-1", mime_type),
                caption: caption.to_string(),
            },
        )
    }

    fn text_query(prompt: &str) -> Route<'static> {
        Route::Query(QueryInput::Text {
            prompt: prompt.to_string(),
        })
    }

    #[test]
    fn own_messages_are_ignored_first() {
        assert_eq!(
            classify(&direct("/reset").from_self()),
            Route::Ignore(IgnoreReason::FromSelf)
        );
    }

    #[test]
    fn direct_text_is_the_prompt() {
        assert_eq!(classify(&direct("  Hello  ")), text_query("Hello"));
        assert_eq!(classify(&direct("/ask Hello")), text_query("/ask Hello"));
    }

    #[test]
    fn group_text_needs_a_trigger() {
        assert_eq!(
            classify(&group("What's the weather")),
            Route::Ignore(IgnoreReason::MissingTrigger)
        );
        assert_eq!(
            classify(&group("/ask What's the weather")),
            text_query("What's the weather")
        );
        assert_eq!(classify(&group("/ai  hi ")), text_query("hi"));
        assert_eq!(
            classify(&group("/aix hi")),
            Route::Ignore(IgnoreReason::MissingTrigger)
        );
    }

    #[test]
    fn bare_trigger_is_an_empty_prompt() {
        assert_eq!(
            classify(&group("/ask   ")),
            Route::Ignore(IgnoreReason::EmptyPrompt)
        );
    }

    #[test]
    fn blank_text_and_other_shapes_are_ignored() {
        assert_eq!(classify(&direct("   ")), Route::Ignore(IgnoreReason::EmptyText));
        let sticker = InboundEvent::new(ChatRef::direct("U1"), Sender::new("U1"), InboundMessage::Other);
        assert_eq!(
            classify(&sticker),
            Route::Ignore(IgnoreReason::UnsupportedMessage)
        );
    }

    #[test]
    fn commands_work_in_groups_without_trigger() {
        assert_eq!(classify(&group("/lang id")), Route::Language(Some("id")));
        assert_eq!(classify(&group("/lang")), Route::Language(None));
        assert_eq!(classify(&group("/reset")), Route::Reset);
        assert_eq!(classify(&direct("/newchat")), Route::Reset);
        assert_eq!(classify(&direct("/location")), Route::Location);
        assert_eq!(classify(&group("/menu")), Route::Menu);
    }

    #[test]
    fn lang_lookalikes_fall_through_to_queries() {
        assert_eq!(classify(&direct("/language id")), text_query("/language id"));
        assert_eq!(
            classify(&group("/language id")),
            Route::Ignore(IgnoreReason::MissingTrigger)
        );
        assert_eq!(classify(&group("/ask /langid")), text_query("/langid"));
    }

    #[test]
    fn images_route_in_any_chat() {
        let event = InboundEvent::new(
            ChatRef::group("G1"),
            Sender::new("U2"),
            InboundMessage::Image {
                attachment: Attachment::new("img-1", "image/jpeg"),
                caption: "no trigger here".to_string(),
            },
        );
        assert!(matches!(
            classify(&event),
            Route::Query(QueryInput::Image { caption, .. }) if caption == "no trigger here"
        ));
    }

    #[test]
    fn unsupported_documents_get_a_notice_anywhere() {
        assert_eq!(
            classify(&document(ChatRef::group("G1"), "application/msword", "")),
            Route::UnsupportedDocument
        );
    }

    #[test]
    fn document_prompts() {
        let doc = |prompt: &str| {
            Route::Query(QueryInput::Document {
                attachment: Attachment::new("doc-1", "application/pdf"),
                prompt: prompt.to_string(),
            })
        };

        assert_eq!(
            classify(&document(ChatRef::direct("U2"), "application/pdf", "")),
            doc(DEFAULT_DOCUMENT_PROMPT)
        );
        assert_eq!(
            classify(&document(ChatRef::direct("U2"), "application/pdf", "key points?")),
            doc("key points?")
        );
        assert_eq!(
            classify(&document(ChatRef::group("G1"), "application/pdf", "/ask key points?")),
            doc("key points?")
        );
        assert_eq!(
            classify(&document(ChatRef::group("G1"), "application/pdf", "/ai")),
            doc(DEFAULT_DOCUMENT_PROMPT)
        );
        assert_eq!(
            classify(&document(ChatRef::group("G1"), "application/pdf", "key points?")),
            Route::Ignore(IgnoreReason::MissingTrigger)
        );
    }
}
