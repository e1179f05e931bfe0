//! OpenAI-compatible provider (streaming)
//!
//! Works with any API that implements the OpenAI chat completions format:
//! - OpenAI (api.openai.com)
//! - Groq (api.groq.com)
//! - vLLM (local server)
//! - LM Studio (local server)
//! - And many more...
//!
//! The system prompt travels as the leading `system` message. Text arrives
//! in `choices[0].delta.content` and the stream closes with `data: [DONE]`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::conversation::{Message, StreamFragment};

use super::sse::{fragment_stream, SseEvent};
use super::{http_client, CompletionGateway, FragmentStream, ProviderError};

/// OpenAI-compatible chat message
#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a Message> for ChatMessage<'a> {
    fn from(msg: &'a Message) -> Self {
        Self {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    stream: bool,
}

/// One streamed chunk (`chat.completion.chunk`)
#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Error response from API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone)]
pub struct OpenAICompatConfig {
    /// Base URL for the API (e.g., https://api.openai.com/v1)
    pub base_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    /// Total time budget for one request, streaming included
    pub timeout: Duration,
    /// Longest gap allowed between two chunks of the stream
    pub idle_timeout: Duration,
}

impl OpenAICompatConfig {
    /// Create config for OpenAI
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: Some(api_key.into()),
            model: model.into(),
            max_tokens: 1024,
            timeout: Duration::from_secs(120),
            idle_timeout: Duration::from_secs(60),
        }
    }

    /// Create config for a local server (vLLM, LM Studio, etc.)
    pub fn local(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            model: model.into(),
            max_tokens: 1024,
            timeout: Duration::from_secs(300), // Local inference can be slower
            idle_timeout: Duration::from_secs(60),
        }
    }
}

/// OpenAI-compatible API provider
pub struct OpenAICompatProvider {
    config: OpenAICompatConfig,
    client: Client,
}

impl OpenAICompatProvider {
    pub fn new(config: OpenAICompatConfig) -> Result<Self, ProviderError> {
        let client = http_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl CompletionGateway for OpenAICompatProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn stream(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<FragmentStream, ProviderError> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let mut chat_messages = Vec::with_capacity(messages.len() + 1);
        chat_messages.push(ChatMessage {
            role: "system",
            content: system_prompt,
        });
        chat_messages.extend(messages.iter().map(ChatMessage::from));

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: chat_messages,
            max_tokens: self.config.max_tokens,
            stream: true,
        };

        let mut req_builder = self.client.post(&url);

        // Add authorization if API key is provided
        if let Some(ref api_key) = self.config.api_key {
            req_builder = req_builder.bearer_auth(api_key);
        }

        let response = req_builder.json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(&body) {
                return Err(ProviderError::InvalidResponse(format!(
                    "API error: {}",
                    error_resp.error.message
                )));
            }
            return Err(ProviderError::InvalidResponse(format!("HTTP {}: {}", status, body)));
        }

        Ok(fragment_stream(
            response,
            self.config.idle_timeout,
            parse_chunk,
        ))
    }
}

fn parse_chunk(payload: &str) -> Result<SseEvent, ProviderError> {
    if payload == "[DONE]" {
        return Ok(SseEvent::Done);
    }

    let chunk: ChatCompletionChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::debug!("Skipping malformed chunk: {}", e);
            return Ok(SseEvent::Skip);
        }
    };

    if let Some(error) = chunk.error {
        return Err(ProviderError::Upstream(error.message));
    }

    let text = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content);

    match text {
        Some(text) => Ok(SseEvent::Fragment(StreamFragment::new(text))),
        None => Ok(SseEvent::Skip),
    }
}
