//! Core reading pipeline
//!
//! Screening, prompt assembly and stream relaying. Everything here works on
//! request-scoped data only.

mod chat;
mod prompt;
mod relay;
mod screening;

pub use chat::{ChatEngine, ChatError};
pub use relay::relay;
pub use screening::REFUSAL_MESSAGE;

#[cfg(test)]
pub(crate) use chat::tests as test_support;
