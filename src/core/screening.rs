//! Pre-flight screening of user-authored text
//!
//! All user turns are joined and lower-cased, then checked for any of a fixed
//! set of adversarial phrases by plain substring containment. There is no
//! punctuation or whitespace normalisation beyond case folding.

use crate::conversation::{Message, Role};

/// Phrases that reject a request outright
pub const ADVERSARIAL_PHRASES: &[&str] = &[
    "system prompt",
    "ignore previous",
    "forget everything",
    "new instructions",
    "you are now",
    "act as",
    "pretend to be",
    "roleplay as",
    "jailbreak",
    "developer mode",
    "admin mode",
    "bypass",
    "override",
    "ignore rules",
    "show me the prompt",
    "what are your instructions",
    "reveal your prompt",
];

/// Shown to the user when screening rejects a request
pub const REFUSAL_MESSAGE: &str =
    "I cannot help with that request. Let's keep our conversation focused on your personal insights.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreeningResult {
    pub flagged: bool,
    /// First phrase that matched, for logging only
    pub matched: Option<&'static str>,
}

pub fn screen(messages: &[Message]) -> ScreeningResult {
    let user_text = messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let matched = ADVERSARIAL_PHRASES
        .iter()
        .copied()
        .find(|phrase| user_text.contains(phrase));

    ScreeningResult {
        flagged: matched.is_some(),
        matched,
    }
}
