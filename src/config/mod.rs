//! Application configuration
//!
//! Resolution order: built-in defaults, then the optional TOML file named by
//! `PSYCHIC_CONFIG`, then individual environment variables. Credentials only
//! ever come from the environment.

pub mod file;
pub mod prompts;

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use file::SettingsFile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub provider: String,
    /// Upstream model; unset means the provider's default
    pub model: Option<String>,
    pub max_tokens: u32,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub idle_timeout_secs: u64,
    #[serde(skip_serializing)]
    pub anthropic_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    pub knowledge_dir: PathBuf,
    pub knowledge_max_file_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            provider: "anthropic".into(),
            model: None,
            max_tokens: 1024,
            base_url: None,
            timeout_secs: 120,
            idle_timeout_secs: 60,
            anthropic_api_key: None,
            openai_api_key: None,
            knowledge_dir: PathBuf::from("knowledge").join("documents"),
            knowledge_max_file_size: 1024 * 1024, // 1 MB
        }
    }
}

/// Model used with the Anthropic provider when none is configured
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

/// Model used with OpenAI-compatible providers when none is configured
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

impl Config {
    /// Configured model, or the default for the selected provider.
    pub fn model(&self) -> &str {
        match self.model {
            Some(ref model) => model,
            None if self.provider.eq_ignore_ascii_case("openai") => DEFAULT_OPENAI_MODEL,
            None => DEFAULT_ANTHROPIC_MODEL,
        }
    }

    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = env::var("PSYCHIC_CONFIG") {
            tracing::info!("Loading settings from {}", path);
            SettingsFile::from_file(&PathBuf::from(path))?.apply(&mut config);
        }

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(host) = env::var("HOST") {
            self.host = host;
        }
        if let Some(port) = parsed_var("PORT") {
            self.port = port;
        }
        if let Ok(provider) = env::var("UPSTREAM_PROVIDER") {
            self.provider = provider;
        }
        if let Ok(model) = env::var("UPSTREAM_MODEL") {
            self.model = Some(model);
        }
        if let Some(max_tokens) = parsed_var("UPSTREAM_MAX_TOKENS") {
            self.max_tokens = max_tokens;
        }
        if let Ok(url) = env::var("UPSTREAM_BASE_URL") {
            self.base_url = Some(url);
        }
        if let Some(secs) = parsed_var("UPSTREAM_TIMEOUT_SECS") {
            self.timeout_secs = secs;
        }
        if let Some(secs) = parsed_var("UPSTREAM_IDLE_TIMEOUT_SECS") {
            self.idle_timeout_secs = secs;
        }
        if let Ok(dir) = env::var("KNOWLEDGE_DIR") {
            self.knowledge_dir = PathBuf::from(dir);
        }
        if let Some(size) = parsed_var("KNOWLEDGE_MAX_FILE_SIZE") {
            self.knowledge_max_file_size = size;
        }

        self.anthropic_api_key = env::var("ANTHROPIC_API_KEY").ok();
        self.openai_api_key = env::var("OPENAI_API_KEY").ok();
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a valid value", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.provider, "anthropic");
        assert_eq!(config.max_tokens, 1024);
        assert!(config.knowledge_dir.ends_with("documents"));
        assert_eq!(config.model(), DEFAULT_ANTHROPIC_MODEL);
    }

    #[test]
    fn test_model_follows_provider() {
        let openai = Config {
            provider: "openai".into(),
            ..Config::default()
        };
        assert_eq!(openai.model(), DEFAULT_OPENAI_MODEL);

        let pinned = Config {
            provider: "openai".into(),
            model: Some("llama-3.1-8b".into()),
            ..Config::default()
        };
        assert_eq!(pinned.model(), "llama-3.1-8b");
    }

    #[test]
    fn test_credentials_never_serialized() {
        let config = Config {
            anthropic_api_key: Some("sk-ant-secret".into()),
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-ant-secret"));
    }
}
