//! Turn classification
//!
//! An exchange is one user turn plus its reply, so the number of exchanges
//! already answered is `message_count / 2`. The phase is a pure function of
//! that number; no client-supplied phase is ever trusted.

use serde::Serialize;

/// Exchange at which the breakthrough statement is delivered
const REVEAL_EXCHANGE: usize = 4;

/// Exchanges after which the conversation wraps up
const CONCLUSION_EXCHANGE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    /// Answering the very first user turn
    Rapport,
    /// Second reply, riffing on the user's own words
    Hook,
    /// Collaborative inquiry turns
    Prospecting,
    /// The single breakthrough statement
    Reveal,
    /// Terminal synthesis; no further questions
    Conclusion,
}

impl ConversationPhase {
    /// Derive the active phase from the number of messages the client sent.
    pub fn classify(message_count: usize) -> Self {
        match message_count / 2 {
            0 => ConversationPhase::Rapport,
            1 => ConversationPhase::Hook,
            REVEAL_EXCHANGE => ConversationPhase::Reveal,
            n if n >= CONCLUSION_EXCHANGE => ConversationPhase::Conclusion,
            _ => ConversationPhase::Prospecting,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ConversationPhase::Conclusion)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationPhase::Rapport => "rapport",
            ConversationPhase::Hook => "hook",
            ConversationPhase::Prospecting => "prospecting",
            ConversationPhase::Reveal => "reveal",
            ConversationPhase::Conclusion => "conclusion",
        }
    }
}

impl std::fmt::Display for ConversationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
