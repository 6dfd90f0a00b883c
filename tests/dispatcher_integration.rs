//! Integration tests for the Dispatcher.
//!
//! These tests drive inbound events end-to-end:
//! 1. Dispatcher classifies the event
//! 2. Handlers read history, call the rotating client, and reply
//! 3. Exchanges are stored under the resolved conversation key
//!
//! Uses the mock backend, in-memory history, and a recording messenger.

use futures::future::join_all;
use secrecy::Secret;
use std::sync::Arc;
use std::time::Duration;

use gemini_relay::adapters::ai::{CredentialPool, CredentialRotatingClient, MockBackend};
use gemini_relay::adapters::i18n::JsonCatalog;
use gemini_relay::adapters::memory::InMemoryHistoryStore;
use gemini_relay::adapters::messaging::{Outbound, RecordingMessenger};
use gemini_relay::adapters::sqlite::SqliteHistoryStore;
use gemini_relay::application::handlers::UNSUPPORTED_DOCUMENT_NOTICE;
use gemini_relay::application::{
    CommandKind, DispatchOutcome, Dispatcher, DispatcherConfig, IgnoreReason, QueryKind,
};
use gemini_relay::domain::conversation::{
    ChatRef, ConversationKey, Persona, PromptTurn, Role, Turn, HISTORY_WINDOW,
};
use gemini_relay::domain::dispatch::{Attachment, InboundEvent, InboundMessage, Language, Sender};
use gemini_relay::domain::foundation::Timestamp;
use gemini_relay::ports::{
    BackendError, GenerationRequest, HistoryStore, Localizer, MessageKey, Presence,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    backend: MockBackend,
    store: InMemoryHistoryStore,
    messenger: RecordingMessenger,
    client: Arc<CredentialRotatingClient>,
    dispatcher: Dispatcher,
}

struct HarnessBuilder {
    backend: MockBackend,
    keys: Vec<&'static str>,
    messenger: RecordingMessenger,
    config: DispatcherConfig,
}

impl HarnessBuilder {
    fn new() -> Self {
        Self {
            backend: MockBackend::new(),
            keys: vec!["k1"],
            messenger: RecordingMessenger::new(),
            config: DispatcherConfig::default(),
        }
    }

    fn backend(mut self, backend: MockBackend) -> Self {
        self.backend = backend;
        self
    }

    fn keys(mut self, keys: &[&'static str]) -> Self {
        self.keys = keys.to_vec();
        self
    }

    fn messenger(mut self, messenger: RecordingMessenger) -> Self {
        self.messenger = messenger;
        self
    }

    fn persona(mut self, text: &str) -> Self {
        self.config.persona = Persona::new(text);
        self
    }

    fn send_timeout(mut self, timeout: Duration) -> Self {
        self.config.send_timeout = timeout;
        self
    }

    fn build(self) -> Harness {
        let store = InMemoryHistoryStore::new();
        self.build_with(store.clone(), Arc::new(store))
    }

    fn build_with(self, store: InMemoryHistoryStore, history: Arc<dyn HistoryStore>) -> Harness {
        let keys = self
            .keys
            .iter()
            .map(|k| Secret::new(k.to_string()))
            .collect();
        let pool = CredentialPool::new(keys).unwrap();
        let client = Arc::new(CredentialRotatingClient::new(
            Arc::new(self.backend.clone()),
            pool,
        ));
        let dispatcher = Dispatcher::new(
            client.clone(),
            history,
            Arc::new(self.messenger.clone()),
            Arc::new(JsonCatalog::embedded().unwrap()),
            self.config,
        );
        Harness {
            backend: self.backend,
            store,
            messenger: self.messenger,
            client,
            dispatcher,
        }
    }
}

fn catalog_text(language: Language, key: MessageKey, args: &[(&str, &str)]) -> String {
    JsonCatalog::embedded().unwrap().localize(language, key, args)
}

fn direct(sender: &str, text: &str) -> InboundEvent {
    InboundEvent::text(ChatRef::direct(sender), Sender::new(sender), text)
}

fn group(sender: &str, text: &str) -> InboundEvent {
    InboundEvent::text(ChatRef::group("G1"), Sender::new(sender), text)
}

fn chat_turns(request: &GenerationRequest) -> Vec<PromptTurn> {
    match request {
        GenerationRequest::Chat { turns } => turns.clone(),
        other => panic!("expected chat request, got {:?}", other),
    }
}

// =============================================================================
// Text queries
// =============================================================================

#[tokio::test]
async fn direct_hello_is_answered_and_stored() {
    let h = HarnessBuilder::new()
        .backend(MockBackend::new().with_response("Hi!"))
        .build();

    let outcome = h.dispatcher.dispatch(&direct("U1", "Hello")).await;

    assert_eq!(outcome, DispatchOutcome::QueryHandled(QueryKind::Text));
    assert_eq!(
        chat_turns(&h.backend.get_calls()[0].request),
        vec![PromptTurn::user("Hello")]
    );
    assert_eq!(h.messenger.texts(), vec!["Hi!"]);

    let stored = h.store.all(&ConversationKey::from_raw("U1")).await;
    assert_eq!(stored.len(), 2);
    assert_eq!((stored[0].role, stored[0].text.as_str()), (Role::User, "Hello"));
    assert_eq!(stored[0].author_name, None);
    assert_eq!((stored[1].role, stored[1].text.as_str()), (Role::Model, "Hi!"));
    assert_eq!(
        h.messenger.presences(),
        vec![Presence::Composing, Presence::Paused]
    );
}

#[tokio::test]
async fn group_message_without_trigger_is_ignored() {
    let h = HarnessBuilder::new().build();

    let outcome = h
        .dispatcher
        .dispatch(&group("U2", "What's the weather"))
        .await;

    assert_eq!(outcome, DispatchOutcome::Ignored(IgnoreReason::MissingTrigger));
    assert_eq!(h.backend.call_count(), 0);
    assert_eq!(h.store.turn_count().await, 0);
    assert!(h.messenger.outbound().is_empty());
}

#[tokio::test]
async fn group_trigger_query_is_keyed_by_group_with_author() {
    let h = HarnessBuilder::new()
        .backend(MockBackend::new().with_response("Sunny"))
        .build();

    let outcome = h
        .dispatcher
        .dispatch(&group("U2", "/ask What's the weather"))
        .await;

    assert_eq!(outcome, DispatchOutcome::QueryHandled(QueryKind::Text));
    assert_eq!(
        chat_turns(&h.backend.get_calls()[0].request),
        vec![PromptTurn::user("U2: What's the weather")]
    );

    let stored = h.store.all(&ConversationKey::from_raw("G1")).await;
    assert_eq!(stored[0].text, "What's the weather");
    assert_eq!(stored[0].author_name.as_deref(), Some("U2"));
    assert!(h.store.all(&ConversationKey::from_raw("U2")).await.is_empty());
}

#[tokio::test]
async fn group_history_attributes_each_speaker() {
    let h = HarnessBuilder::new()
        .backend(MockBackend::new().with_response("Hello Alice").with_response("Hello Bob"))
        .build();

    h.dispatcher.dispatch(&group("Alice", "/ai hi")).await;
    h.dispatcher.dispatch(&group("Bob", "/ai and me?")).await;

    assert_eq!(
        chat_turns(&h.backend.get_calls()[1].request),
        vec![
            PromptTurn::user("Alice: hi"),
            PromptTurn::model("Hello Alice"),
            PromptTurn::user("Bob: and me?"),
        ]
    );
}

#[tokio::test]
async fn persona_wraps_prompt_but_not_stored_turn() {
    let h = HarnessBuilder::new()
        .backend(MockBackend::new().with_response("ok"))
        .persona("You are a barista talking to {{user_name}}.")
        .build();

    h.dispatcher.dispatch(&direct("U1", "Any coffee?")).await;

    let turns = chat_turns(&h.backend.get_calls()[0].request);
    assert_eq!(
        turns[0].text,
        "Use this personality to answer:\n\"\"\"\nYou are a barista talking to User.\n\"\"\"\n\nUser's Question: Any coffee?"
    );
    assert_eq!(
        h.store.all(&ConversationKey::from_raw("U1")).await[0].text,
        "Any coffee?"
    );
}

#[tokio::test]
async fn context_window_is_capped() {
    let h = HarnessBuilder::new().build();
    let key = ConversationKey::from_raw("U1");
    let base = Timestamp::now().plus_millis(-60_000);
    for i in 0..30 {
        h.store
            .append(&key, &Turn::user(format!("old {}", i), None).at(base.plus_millis(i)))
            .await
            .unwrap();
    }

    h.dispatcher.dispatch(&direct("U1", "newest")).await;

    let turns = chat_turns(&h.backend.get_calls()[0].request);
    assert_eq!(turns.len(), HISTORY_WINDOW as usize + 1);
    assert_eq!(turns[0].text, "old 10");
    assert_eq!(turns.last().unwrap().text, "newest");
}

#[tokio::test]
async fn own_messages_never_reach_the_backend() {
    let h = HarnessBuilder::new().build();

    let outcome = h
        .dispatcher
        .dispatch(&direct("U1", "Hello").from_self())
        .await;

    assert_eq!(outcome, DispatchOutcome::Ignored(IgnoreReason::FromSelf));
    assert_eq!(h.backend.call_count(), 0);
}

// =============================================================================
// Credential rotation
// =============================================================================

#[tokio::test]
async fn rotation_persists_across_conversations() {
    let h = HarnessBuilder::new()
        .keys(&["k1", "k2", "k3"])
        .backend(
            MockBackend::new()
                .with_error(BackendError::quota_exceeded("RESOURCE_EXHAUSTED"))
                .with_response("from k2")
                .with_response("still k2"),
        )
        .build();

    let first = h.dispatcher.dispatch(&direct("U1", "one")).await;
    let second = h.dispatcher.dispatch(&direct("U9", "two")).await;

    assert_eq!(first, DispatchOutcome::QueryHandled(QueryKind::Text));
    assert_eq!(second, DispatchOutcome::QueryHandled(QueryKind::Text));
    assert_eq!(h.backend.used_keys(), vec!["k1", "k2", "k2"]);
    assert_eq!(h.client.cursor().await, 1);
}

#[tokio::test]
async fn exhausted_pool_replies_localized_error_without_storing() {
    let h = HarnessBuilder::new()
        .keys(&["k1", "k2"])
        .backend(
            MockBackend::new()
                .with_error(BackendError::quota_exceeded("429"))
                .with_error(BackendError::quota_exceeded("429")),
        )
        .build();
    h.store.set_language("U1", Language::Id).await.unwrap();

    let outcome = h.dispatcher.dispatch(&direct("U1", "Hello")).await;

    assert_eq!(outcome, DispatchOutcome::QueryFailed(QueryKind::Text));
    assert_eq!(h.backend.used_keys(), vec!["k1", "k2"]);
    assert_eq!(
        h.messenger.texts(),
        vec![catalog_text(Language::Id, MessageKey::ErrorGemini, &[])]
    );
    assert_eq!(h.store.turn_count().await, 0);
    assert_eq!(
        h.messenger.presences(),
        vec![Presence::Composing, Presence::Paused]
    );
}

#[tokio::test]
async fn fatal_error_is_not_retried() {
    let h = HarnessBuilder::new()
        .keys(&["k1", "k2"])
        .backend(MockBackend::new().with_error(BackendError::fatal("400 INVALID_ARGUMENT")))
        .build();

    let outcome = h.dispatcher.dispatch(&direct("U1", "Hello")).await;

    assert_eq!(outcome, DispatchOutcome::QueryFailed(QueryKind::Text));
    assert_eq!(h.backend.call_count(), 1);
    assert_eq!(h.client.cursor().await, 0);
}

#[tokio::test]
async fn concurrent_events_serialize_backend_calls() {
    let h = HarnessBuilder::new()
        .backend(MockBackend::new().with_delay(Duration::from_millis(10)))
        .build();
    let events: Vec<InboundEvent> = (0..6).map(|i| direct(&format!("U{}", i), "hi")).collect();

    let outcomes = join_all(events.iter().map(|e| h.dispatcher.dispatch(e))).await;

    assert!(outcomes
        .iter()
        .all(|o| *o == DispatchOutcome::QueryHandled(QueryKind::Text)));
    assert_eq!(h.backend.max_in_flight(), 1);
    for i in 0..6 {
        let key = ConversationKey::from_raw(format!("U{}", i));
        assert_eq!(h.store.all(&key).await.len(), 2);
    }
}

// =============================================================================
// Commands
// =============================================================================

#[tokio::test]
async fn unknown_language_keeps_preference() {
    let h = HarnessBuilder::new().build();

    let outcome = h.dispatcher.dispatch(&direct("U1", "/lang fr")).await;

    assert_eq!(outcome, DispatchOutcome::CommandHandled(CommandKind::Language));
    assert_eq!(
        h.messenger.texts(),
        vec![catalog_text(Language::En, MessageKey::LangNotFound, &[("lang", "fr")])]
    );
    assert_eq!(h.store.language("U1").await.unwrap(), None);
    assert_eq!(h.backend.call_count(), 0);
}

#[tokio::test]
async fn language_switch_changes_later_error_replies() {
    let h = HarnessBuilder::new()
        .backend(MockBackend::new().with_error(BackendError::fatal("boom")))
        .build();

    h.dispatcher.dispatch(&group("U2", "/lang id")).await;
    h.dispatcher.dispatch(&group("U2", "/ask hi")).await;

    assert_eq!(
        h.messenger.texts(),
        vec![
            catalog_text(Language::Id, MessageKey::LangUpdated, &[]),
            catalog_text(Language::Id, MessageKey::ErrorGemini, &[]),
        ]
    );
}

#[tokio::test]
async fn reset_clears_only_the_resolved_key() {
    let h = HarnessBuilder::new().build();
    h.dispatcher.dispatch(&group("U2", "/ask hi")).await;
    h.dispatcher.dispatch(&direct("U2", "hi")).await;

    let outcome = h.dispatcher.dispatch(&group("U2", "/reset")).await;

    assert_eq!(outcome, DispatchOutcome::CommandHandled(CommandKind::Reset));
    let group_key = ConversationKey::from_raw("G1");
    assert!(h
        .store
        .recent(&group_key, HISTORY_WINDOW)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(h.store.all(&ConversationKey::from_raw("U2")).await.len(), 2);
    assert_eq!(
        h.messenger.texts().last().unwrap(),
        &catalog_text(Language::En, MessageKey::ResetSuccess, &[])
    );
}

#[tokio::test]
async fn reset_on_sqlite_empties_the_window() {
    let store = InMemoryHistoryStore::new();
    let sqlite = Arc::new(SqliteHistoryStore::connect("sqlite::memory:", 1).await.unwrap());
    let h = HarnessBuilder::new()
        .backend(MockBackend::new().with_response("Hi!"))
        .build_with(store, sqlite.clone());
    let key = ConversationKey::from_raw("U1");

    h.dispatcher.dispatch(&direct("U1", "Hello")).await;
    assert_eq!(sqlite.recent(&key, HISTORY_WINDOW).await.unwrap().len(), 2);

    h.dispatcher.dispatch(&direct("U1", "/newchat")).await;
    assert!(sqlite.recent(&key, HISTORY_WINDOW).await.unwrap().is_empty());
}

#[tokio::test]
async fn store_commands_without_configuration() {
    let h = HarnessBuilder::new().build();

    h.dispatcher.dispatch(&direct("U1", "/location")).await;
    h.dispatcher.dispatch(&direct("U1", "/menu")).await;

    assert_eq!(
        h.messenger.texts(),
        vec![
            "Sorry, the store location is not configured yet.",
            "Sorry, the image file is not configured yet.",
        ]
    );
    assert_eq!(h.backend.call_count(), 0);
}

// =============================================================================
// Attachments
// =============================================================================

#[tokio::test]
async fn group_image_is_answered_without_trigger() {
    let messenger = RecordingMessenger::new().with_download("img-1", vec![0xff, 0xd8, 0xff, 0xe0]);
    let h = HarnessBuilder::new()
        .backend(MockBackend::new().with_response("A latte"))
        .messenger(messenger)
        .build();
    let event = InboundEvent::new(
        ChatRef::group("G1"),
        Sender::new("U2").with_display_name("Dewi"),
        InboundMessage::Image {
            attachment: Attachment::new("img-1", "image/jpeg"),
            caption: "what drink is this?".to_string(),
        },
    );

    let outcome = h.dispatcher.dispatch(&event).await;

    assert_eq!(outcome, DispatchOutcome::QueryHandled(QueryKind::Image));
    match &h.backend.get_calls()[0].request {
        GenerationRequest::Attachment { prompt, attachment } => {
            assert_eq!(prompt, "what drink is this?");
            assert_eq!(attachment.data, vec![0xff, 0xd8, 0xff, 0xe0]);
        }
        other => panic!("expected attachment request, got {:?}", other),
    }
    let stored = h.store.all(&ConversationKey::from_raw("G1")).await;
    assert_eq!(stored[0].text, "[User sent an image] what drink is this?");
    assert_eq!(stored[0].author_name.as_deref(), Some("Dewi"));
    assert_eq!(stored[1].text, "A latte");
}

#[tokio::test]
async fn direct_pdf_without_caption_is_summarized() {
    let messenger = RecordingMessenger::new().with_download("doc-1", b"%PDF-1.7".to_vec());
    let h = HarnessBuilder::new()
        .backend(MockBackend::new().with_response("Summary"))
        .messenger(messenger)
        .build();
    let event = InboundEvent::new(
        ChatRef::direct("U1"),
        Sender::new("U1"),
        InboundMessage::Document {
            attachment: Attachment::new("doc-1", "application/pdf"),
            caption: String::new(),
        },
    );

    let outcome = h.dispatcher.dispatch(&event).await;

    assert_eq!(outcome, DispatchOutcome::QueryHandled(QueryKind::Document));
    let stored = h.store.all(&ConversationKey::from_raw("U1")).await;
    assert_eq!(
        stored[0].text,
        "[User sent a PDF] Please summarize this document."
    );
}

#[tokio::test]
async fn unsupported_document_gets_notice() {
    let h = HarnessBuilder::new().build();
    let event = InboundEvent::new(
        ChatRef::direct("U1"),
        Sender::new("U1"),
        InboundMessage::Document {
            attachment: Attachment::new("doc-1", "application/vnd.ms-excel"),
            caption: String::new(),
        },
    );

    let outcome = h.dispatcher.dispatch(&event).await;

    assert_eq!(outcome, DispatchOutcome::Unsupported);
    assert_eq!(h.messenger.texts(), vec![UNSUPPORTED_DOCUMENT_NOTICE]);
    assert_eq!(h.backend.call_count(), 0);
    assert_eq!(h.store.turn_count().await, 0);
}

#[tokio::test]
async fn failed_download_sends_nothing() {
    let h = HarnessBuilder::new().build();
    let event = InboundEvent::new(
        ChatRef::direct("U1"),
        Sender::new("U1"),
        InboundMessage::Image {
            attachment: Attachment::new("gone", "image/png"),
            caption: String::new(),
        },
    );

    let outcome = h.dispatcher.dispatch(&event).await;

    assert_eq!(outcome, DispatchOutcome::DownloadFailed(QueryKind::Image));
    assert!(h.messenger.texts().is_empty());
    assert_eq!(h.backend.call_count(), 0);
}

// =============================================================================
// Delivery
// =============================================================================

#[tokio::test]
async fn timed_out_reply_still_stores_exchange() {
    let messenger = RecordingMessenger::new().with_send_delay(Duration::from_millis(300));
    let h = HarnessBuilder::new()
        .backend(MockBackend::new().with_response("late"))
        .messenger(messenger)
        .send_timeout(Duration::from_millis(20))
        .build();

    let outcome = h.dispatcher.dispatch(&direct("U1", "Hello")).await;

    assert_eq!(outcome, DispatchOutcome::QueryHandled(QueryKind::Text));
    assert!(h.messenger.texts().is_empty());
    assert_eq!(h.store.turn_count().await, 2);
    assert!(matches!(
        h.messenger.outbound().last(),
        Some(Outbound::Presence {
            presence: Presence::Paused,
            ..
        })
    ));
}
