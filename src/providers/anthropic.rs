//! Anthropic Messages API provider (streaming)
//!
//! Text arrives as `content_block_delta` events carrying a `text_delta`;
//! `message_stop` closes the stream. Other event types (`message_start`,
//! `ping`, thinking or tool deltas) hold no user-visible text and are skipped.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::conversation::{Message, StreamFragment};

use super::sse::{fragment_stream, SseEvent};
use super::{http_client, CompletionGateway, FragmentStream, ProviderError};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a Message> for AnthropicMessage<'a> {
    fn from(msg: &'a Message) -> Self {
        Self {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    ContentBlockDelta { delta: Delta },
    MessageStop,
    Error { error: ApiError },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Delta {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

/// Error body, both as an HTTP response and as an in-stream event
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

impl ApiError {
    fn describe(&self) -> String {
        match self.error_type {
            Some(ref kind) => format!("{}: {}", kind, self.message),
            None => self.message.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// Base URL for the API (e.g., https://api.anthropic.com/v1)
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    /// Total time budget for one request, streaming included
    pub timeout: Duration,
    /// Longest gap allowed between two chunks of the stream
    pub idle_timeout: Duration,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.anthropic.com/v1".to_string(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 1024,
            timeout: Duration::from_secs(120),
            idle_timeout: Duration::from_secs(60),
        }
    }
}

pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicConfig) -> Result<Self, ProviderError> {
        let client = http_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl CompletionGateway for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn stream(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<FragmentStream, ProviderError> {
        let url = format!("{}/messages", self.config.base_url);

        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: system_prompt,
            messages: messages.iter().map(AnthropicMessage::from).collect(),
            stream: true,
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(&body) {
                return Err(ProviderError::InvalidResponse(format!(
                    "HTTP {}: {}",
                    status,
                    error_resp.error.describe()
                )));
            }
            return Err(ProviderError::InvalidResponse(format!("HTTP {}: {}", status, body)));
        }

        Ok(fragment_stream(
            response,
            self.config.idle_timeout,
            parse_event,
        ))
    }
}

fn parse_event(payload: &str) -> Result<SseEvent, ProviderError> {
    let event: StreamEvent = match serde_json::from_str(payload) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!("Skipping malformed stream event: {}", e);
            return Ok(SseEvent::Skip);
        }
    };

    match event {
        StreamEvent::ContentBlockDelta {
            delta: Delta::TextDelta { text },
        } => Ok(SseEvent::Fragment(StreamFragment::new(text))),
        StreamEvent::MessageStop => Ok(SseEvent::Done),
        StreamEvent::Error { error } => Err(ProviderError::Upstream(error.describe())),
        _ => Ok(SseEvent::Skip),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    #[test]
    fn test_text_delta() {
        let payload = r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Right,"}}"#;
        assert_eq!(
            parse_event(payload).unwrap(),
            SseEvent::Fragment(StreamFragment::new("Right,"))
        );
    }

    #[test]
    fn test_non_text_events_skipped() {
        let payloads = [
            r#"{"type":"message_start","message":{"id":"msg_1"}}"#,
            r#"{"type":"ping"}"#,
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"input_json_delta","partial_json":"{"}}"#,
            r#"{"type":"content_block_stop","index":0}"#,
            r#"not json at all"#,
        ];
        for payload in payloads {
            assert_eq!(parse_event(payload).unwrap(), SseEvent::Skip, "{}", payload);
        }
    }

    #[test]
    fn test_message_stop() {
        assert_eq!(parse_event(r#"{"type":"message_stop"}"#).unwrap(), SseEvent::Done);
    }

    #[test]
    fn test_error_event() {
        let payload = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        match parse_event(payload) {
            Err(ProviderError::Upstream(msg)) => assert!(msg.contains("Overloaded")),
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[test]
    fn test_request_shape() {
        let history = vec![Message::user("I feel stuck")];
        let request = MessagesRequest {
            model: "claude-sonnet-4-20250514",
            max_tokens: 1024,
            system: "persona",
            messages: history.iter().map(AnthropicMessage::from).collect(),
            stream: true,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["stream"], true);
        assert_eq!(json["system"], "persona");
        assert_eq!(json["messages"][0]["role"], Role::User.as_str());
        assert_eq!(json["messages"][0]["content"], "I feel stuck");
    }
}
