//! Optional settings file loaded from TOML
//!
//! Every key is optional; anything left out keeps the built-in default and
//! can still be overridden from the environment. API keys are never read
//! from this file.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 3000
//!
//! [upstream]
//! provider = "anthropic"
//! model = "claude-sonnet-4-20250514"
//! max_tokens = 1024
//! timeout_secs = 120
//! idle_timeout_secs = 60
//!
//! [knowledge]
//! dir = "./knowledge/documents"
//! max_file_size = 1048576
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::Config;

/// Root of the settings file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub upstream: UpstreamSettings,

    #[serde(default)]
    pub knowledge: KnowledgeSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Completion API settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamSettings {
    /// Provider name: "anthropic" or "openai"
    pub provider: Option<String>,

    pub model: Option<String>,

    pub max_tokens: Option<u32>,

    /// Custom API endpoint (OpenAI-compatible servers, proxies)
    pub base_url: Option<String>,

    /// Total time budget for one upstream request
    pub timeout_secs: Option<u64>,

    /// Longest silence tolerated between two upstream chunks
    pub idle_timeout_secs: Option<u64>,
}

/// Reference material settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeSettings {
    pub dir: Option<PathBuf>,

    /// Files above this size (bytes) are skipped
    pub max_file_size: Option<u64>,
}

impl SettingsFile {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: SettingsFile = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream.max_tokens == Some(0) {
            return Err(ConfigError::Validation(
                "upstream.max_tokens must be greater than zero".into(),
            ));
        }
        if self.upstream.idle_timeout_secs == Some(0) || self.upstream.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "upstream timeouts must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Overlay every value present in the file onto `config`.
    pub fn apply(self, config: &mut Config) {
        if let Some(host) = self.server.host {
            config.host = host;
        }
        if let Some(port) = self.server.port {
            config.port = port;
        }

        let upstream = self.upstream;
        if let Some(provider) = upstream.provider {
            config.provider = provider;
        }
        if let Some(model) = upstream.model {
            config.model = Some(model);
        }
        if let Some(max_tokens) = upstream.max_tokens {
            config.max_tokens = max_tokens;
        }
        if upstream.base_url.is_some() {
            config.base_url = upstream.base_url;
        }
        if let Some(secs) = upstream.timeout_secs {
            config.timeout_secs = secs;
        }
        if let Some(secs) = upstream.idle_timeout_secs {
            config.idle_timeout_secs = secs;
        }

        if let Some(dir) = self.knowledge.dir {
            config.knowledge_dir = dir;
        }
        if let Some(size) = self.knowledge.max_file_size {
            config.knowledge_max_file_size = size;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
