//! Conversation types and turn-phase classification
//!
//! History is owned by the client and re-sent on every request. The server
//! only ever reads it, and everything it needs (the active phase) is derived
//! from the number of messages.

mod phase;

use serde::{Deserialize, Serialize};

pub use phase::ConversationPhase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[cfg(test)]
impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One incremental unit of model output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamFragment {
    pub text: String,
}

impl StreamFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
