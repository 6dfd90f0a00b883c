//! Context window for generation requests.
//!
//! Turns a window of stored history plus the new prompt into the ordered,
//! role-tagged list handed to the backend. The window is count-based: only
//! the most recent [`HISTORY_WINDOW`] stored turns are ever visible.

use serde::{Deserialize, Serialize};

use super::persona::Persona;
use super::turn::{Role, Turn};

/// Number of most recent stored turns supplied as context.
pub const HISTORY_WINDOW: u32 = 20;

/// A role-tagged turn ready for the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTurn {
    /// Who produced the turn.
    pub role: Role,
    /// Text after author prefixing and persona wrapping.
    pub text: String,
}

impl PromptTurn {
    /// Creates a user prompt turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Creates a model prompt turn.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

impl From<&Turn> for PromptTurn {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            text: turn.backend_text(),
        }
    }
}

/// Ephemeral, per-request ordered turns ending with the new user turn.
///
/// Never persisted; rebuilt from history on every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationContext {
    turns: Vec<PromptTurn>,
}

impl ConversationContext {
    /// Composes the context for one query.
    ///
    /// `window` must be ordered oldest first. Anything beyond the most
    /// recent [`HISTORY_WINDOW`] entries is dropped.
    pub fn compose(
        window: &[Turn],
        prompt: &str,
        author_name: Option<&str>,
        persona: Option<&Persona>,
    ) -> Self {
        let skip = window.len().saturating_sub(HISTORY_WINDOW as usize);
        let mut turns: Vec<PromptTurn> = window[skip..].iter().map(PromptTurn::from).collect();

        let named_prompt = match author_name.filter(|n| !n.is_empty()) {
            Some(name) => format!("{}: {}", name, prompt),
            None => prompt.to_string(),
        };
        let final_text = match persona {
            Some(p) => p.wrap_question(&named_prompt, author_name),
            None => named_prompt,
        };
        turns.push(PromptTurn::user(final_text));

        Self { turns }
    }

    /// All turns, oldest first, the new prompt last.
    pub fn turns(&self) -> &[PromptTurn] {
        &self.turns
    }

    /// Turns preceding the new prompt.
    pub fn history(&self) -> &[PromptTurn] {
        &self.turns[..self.turns.len() - 1]
    }

    /// The new user prompt.
    pub fn latest(&self) -> &PromptTurn {
        &self.turns[self.turns.len() - 1]
    }

    /// Number of turns including the new prompt.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Always false; a context holds at least the new prompt.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
