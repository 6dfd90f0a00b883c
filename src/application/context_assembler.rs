//! Context assembly - reads the history window and composes the request.

use std::sync::Arc;
use tracing::warn;

use crate::domain::conversation::{ConversationContext, ConversationKey, Persona, HISTORY_WINDOW};
use crate::ports::HistoryStore;

/// Builds the ordered turns for one chat query.
#[derive(Clone)]
pub struct ContextAssembler {
    history: Arc<dyn HistoryStore>,
    persona: Option<Persona>,
}

impl ContextAssembler {
    pub fn new(history: Arc<dyn HistoryStore>, persona: Option<Persona>) -> Self {
        Self { history, persona }
    }

    /// The configured persona, if any.
    pub fn persona(&self) -> Option<&Persona> {
        self.persona.as_ref()
    }

    /// Reads the last [`HISTORY_WINDOW`] turns for `key` and appends `prompt`.
    ///
    /// A failed read degrades to an empty window.
    pub async fn assemble(
        &self,
        key: &ConversationKey,
        prompt: &str,
        author_name: Option<&str>,
    ) -> ConversationContext {
        let window = match self.history.recent(key, HISTORY_WINDOW).await {
            Ok(turns) => turns,
            Err(err) => {
                warn!(key = %key, error = %err, "History read failed, continuing without context");
                Vec::new()
            }
        };

        ConversationContext::compose(&window, prompt, author_name, self.persona.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryHistoryStore;
    use crate::domain::conversation::{PromptTurn, Role, Turn};
    use crate::domain::foundation::Timestamp;

    fn key() -> ConversationKey {
        ConversationKey::from_raw("G1")
    }

    #[tokio::test]
    async fn first_message_has_single_turn() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let assembler = ContextAssembler::new(store, None);

        let ctx = assembler.assemble(&key(), "Hello", None).await;

        assert_eq!(ctx.turns(), &[PromptTurn::user("Hello")]);
    }

    #[tokio::test]
    async fn stored_authors_prefix_history_turns() {
        let store = Arc::new(InMemoryHistoryStore::new());
        store
            .append(&key(), &Turn::user("hi all", Some("Alice".to_string())))
            .await
            .unwrap();
        store.append(&key(), &Turn::model("hello Alice")).await.unwrap();
        let assembler = ContextAssembler::new(store, None);

        let ctx = assembler.assemble(&key(), "and me?", Some("Bob")).await;

        assert_eq!(
            ctx.turns(),
            &[
                PromptTurn::user("Alice: hi all"),
                PromptTurn::model("hello Alice"),
                PromptTurn::user("Bob: and me?"),
            ]
        );
    }

    #[tokio::test]
    async fn window_is_capped_at_twenty_stored_turns() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let base = Timestamp::now();
        for i in 0..30 {
            store
                .append(&key(), &Turn::user(format!("m{}", i), None).at(base.plus_millis(i)))
                .await
                .unwrap();
        }
        let assembler = ContextAssembler::new(store, None);

        let ctx = assembler.assemble(&key(), "latest", None).await;

        assert_eq!(ctx.len(), 21);
        assert_eq!(ctx.turns()[0].text, "m10");
        assert_eq!(ctx.latest().text, "latest");
    }

    #[tokio::test]
    async fn persona_wraps_only_the_new_prompt() {
        let store = Arc::new(InMemoryHistoryStore::new());
        store.append(&key(), &Turn::model("earlier")).await.unwrap();
        let persona = Persona::new("You are helping {{user_name}}.");
        let assembler = ContextAssembler::new(store, persona);

        let ctx = assembler.assemble(&key(), "What's new?", Some("Bob")).await;

        assert_eq!(ctx.turns()[0], PromptTurn::model("earlier"));
        assert_eq!(ctx.latest().role, Role::User);
        assert_eq!(
            ctx.latest().text,
            "Use this personality to answer:\n\"\"\"\nYou are helping Bob.\n\"\"\"\n\nUser's Question: Bob: What's new?"
        );
    }

    #[tokio::test]
    async fn read_failure_degrades_to_empty_window() {
        let store = Arc::new(InMemoryHistoryStore::new());
        store.append(&key(), &Turn::model("hidden")).await.unwrap();
        store.set_fail_reads(true);
        let assembler = ContextAssembler::new(store, None);

        let ctx = assembler.assemble(&key(), "Hello", None).await;

        assert_eq!(ctx.turns(), &[PromptTurn::user("Hello")]);
    }
}
