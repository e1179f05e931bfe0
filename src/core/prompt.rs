//! System prompt assembly
//!
//! Three layers, in order: the static persona rules, the directive for the
//! active phase, and (only when there is any) the loaded reference text.

use crate::config::prompts::{builtin, directives};
use crate::conversation::ConversationPhase;

/// Fully assembled system instruction for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompt(String);

impl SystemPrompt {
    pub fn assemble(phase: ConversationPhase, reference_text: &str) -> Self {
        let mut sections = vec![
            builtin::PERSONA.to_string(),
            builtin::SECURITY.to_string(),
            builtin::TONE.to_string(),
            builtin::ANTI_MYSTICAL.to_string(),
            forbidden_terms(),
            builtin::ALLOWED_LANGUAGE.to_string(),
            builtin::FOCUS.to_string(),
            phase_directive(phase).to_string(),
        ];

        if !reference_text.trim().is_empty() {
            sections.push(format!("{}\n{}", builtin::KNOWLEDGE_HEADING, reference_text));
        }

        sections.push(builtin::CLOSING_REMINDER.to_string());

        Self(sections.join("\n\n"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn forbidden_terms() -> String {
    let quoted = builtin::FORBIDDEN_TERMS
        .iter()
        .map(|t| format!("'{}'", t))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Forbidden Terms: never use {}.", quoted)
}

fn phase_directive(phase: ConversationPhase) -> &'static str {
    match phase {
        ConversationPhase::Rapport => directives::RAPPORT,
        ConversationPhase::Hook => directives::HOOK,
        ConversationPhase::Prospecting => directives::PROSPECTING,
        ConversationPhase::Reveal => directives::REVEAL,
        ConversationPhase::Conclusion => directives::CONCLUSION,
    }
}
