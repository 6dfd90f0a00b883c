//! Stored conversation turns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Timestamp, ValidationError};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message written by a chat participant.
    User,
    /// Message generated by the model.
    Model,
}

impl Role {
    /// Wire/storage name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "model" => Ok(Role::Model),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// One immutable message in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced this turn.
    pub role: Role,
    /// Message text.
    pub text: String,
    /// Display name of the author, attached at creation time only.
    pub author_name: Option<String>,
    /// When the turn was created.
    pub created_at: Timestamp,
}

impl Turn {
    /// Creates a user turn stamped with the current time.
    pub fn user(text: impl Into<String>, author_name: Option<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            author_name,
            created_at: Timestamp::now(),
        }
    }

    /// Creates a model turn stamped with the current time.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
            author_name: None,
            created_at: Timestamp::now(),
        }
    }

    /// Overrides the creation time.
    pub fn at(mut self, created_at: Timestamp) -> Self {
        self.created_at = created_at;
        self
    }

    /// Returns true if the turn carries text worth persisting.
    pub fn is_persistable(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Text as handed to the backend.
    ///
    /// User turns with an author are prefixed `"<name>: "` so the model can
    /// tell speakers apart in group chats.
    pub fn backend_text(&self) -> String {
        match (self.role, self.author_name.as_deref()) {
            (Role::User, Some(name)) if !name.is_empty() => format!("{}: {}", name, self.text),
            _ => self.text.clone(),
        }
    }
}
