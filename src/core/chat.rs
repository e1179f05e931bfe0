//! Chat engine: one request through the reading pipeline
//!
//! The ChatEngine:
//! 1. Screens the user turns and rejects adversarial input
//! 2. Loads the reference text
//! 3. Classifies the conversation phase from the message count
//! 4. Assembles the phase's system prompt
//! 5. Opens the upstream completion stream and waits for its first item,
//!    so an upstream that fails before producing text fails the request
//!
//! The engine holds no per-conversation state; the client re-sends the full
//! history on every request.

use std::sync::Arc;

use futures::{future, stream, StreamExt};

use crate::conversation::{ConversationPhase, Message};
use crate::knowledge::{KnowledgeError, KnowledgeLoader};
use crate::providers::{CompletionGateway, FragmentStream, ProviderError};

use super::prompt::SystemPrompt;
use super::screening::screen;

/// Errors from the chat engine
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Input rejected by screening (matched {0:?})")]
    InputRejected(&'static str),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

pub struct ChatEngine {
    gateway: Arc<dyn CompletionGateway>,
    knowledge: KnowledgeLoader,
}

impl ChatEngine {
    pub fn new(gateway: Arc<dyn CompletionGateway>, knowledge: KnowledgeLoader) -> Self {
        Self { gateway, knowledge }
    }

    /// Run the pre-stream pipeline and return the upstream fragment stream.
    pub async fn respond(&self, messages: &[Message]) -> Result<FragmentStream, ChatError> {
        let screening = screen(messages);
        if screening.flagged {
            return Err(ChatError::InputRejected(
                screening.matched.unwrap_or_default(),
            ));
        }

        let reference = self.knowledge.load().await?;

        let phase = ConversationPhase::classify(messages.len());
        tracing::debug!(
            phase = %phase,
            terminal = phase.is_terminal(),
            messages = messages.len(),
            reference_bytes = reference.len(),
            "Selected conversation phase"
        );

        let prompt = SystemPrompt::assemble(phase, &reference);

        let mut fragments = self.gateway.stream(prompt.as_str(), messages).await?;

        match fragments.next().await {
            Some(Err(e)) => Err(ChatError::Provider(e)),
            Some(Ok(first)) => Ok(Box::pin(
                stream::once(future::ready(Ok(first))).chain(fragments),
            )),
            None => Ok(fragments),
        }
    }
}
