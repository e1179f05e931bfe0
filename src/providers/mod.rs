//! AI provider integrations
//!
//! Every provider speaks to its upstream over a streaming HTTP request and
//! exposes the result as an ordered stream of text fragments. Errors before
//! the first byte come back as `Err` from [`CompletionGateway::stream`];
//! errors after that arrive as the final item of the stream.

mod anthropic;
mod openai_compat;
mod sse;

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;
use thiserror::Error;

use crate::config::Config;
use crate::conversation::{Message, StreamFragment};

pub use anthropic::{AnthropicConfig, AnthropicProvider};
pub use openai_compat::{OpenAICompatConfig, OpenAICompatProvider};

/// Ordered fragments from one upstream completion
pub type FragmentStream =
    Pin<Box<dyn Stream<Item = Result<StreamFragment, ProviderError>> + Send + 'static>>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("No data from upstream for {0:?}")]
    Timeout(Duration),

    #[error("Upstream stream ended before completion")]
    Truncated,
}

/// Streaming completion API seam
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    /// Open one streaming completion for `messages` under `system_prompt`.
    async fn stream(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<FragmentStream, ProviderError>;
}

pub struct Provider;

impl Provider {
    /// Build the gateway named by `config.provider`.
    pub fn from_config(config: &Config) -> Result<Arc<dyn CompletionGateway>, ProviderError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let idle_timeout = Duration::from_secs(config.idle_timeout_secs);

        match config.provider.to_lowercase().as_str() {
            "anthropic" | "claude" => {
                let api_key = config
                    .anthropic_api_key
                    .clone()
                    .ok_or_else(|| ProviderError::NotConfigured("ANTHROPIC_API_KEY".into()))?;
                let mut provider_config = AnthropicConfig::new(api_key, config.model());
                if let Some(ref url) = config.base_url {
                    provider_config.base_url = url.clone();
                }
                provider_config.max_tokens = config.max_tokens;
                provider_config.timeout = timeout;
                provider_config.idle_timeout = idle_timeout;
                Ok(Arc::new(AnthropicProvider::new(provider_config)?))
            }
            "openai" => {
                let mut provider_config = match config.base_url {
                    Some(ref url) => OpenAICompatConfig::local(url, config.model()),
                    None => {
                        let api_key = config
                            .openai_api_key
                            .clone()
                            .ok_or_else(|| ProviderError::NotConfigured("OPENAI_API_KEY".into()))?;
                        OpenAICompatConfig::openai(api_key, config.model())
                    }
                };
                if provider_config.api_key.is_none() {
                    provider_config.api_key = config.openai_api_key.clone();
                }
                provider_config.max_tokens = config.max_tokens;
                provider_config.timeout = timeout;
                provider_config.idle_timeout = idle_timeout;
                Ok(Arc::new(OpenAICompatProvider::new(provider_config)?))
            }
            _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
        }
    }
}

/// Build the shared HTTP client with bounded connect and total timeouts.
fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    Ok(reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(timeout)
        .build()?)
}
