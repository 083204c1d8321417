//! Configuration types for the howdy engine.
//!
//! Everything has a default, so an empty `{}` file is a valid config. The
//! API key itself is never stored; only the name of the environment variable
//! that holds it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::prompts::EXAMPLE_PROMPTS;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "howdy.json";

/// Environment variable overriding the endpoint URL.
pub const ENV_ENDPOINT: &str = "HOWDY_ENDPOINT";

/// Environment variable overriding the model name.
pub const ENV_MODEL: &str = "HOWDY_MODEL";

/// Main configuration for howdy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Completion endpoint connection details.
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Optional system prompt sent ahead of the history on every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Glyph set used for icons.
    #[serde(default)]
    pub icons: IconMode,

    /// Example prompts offered while the conversation is empty.
    #[serde(default = "default_examples")]
    pub examples: Vec<String>,
}

fn default_examples() -> Vec<String> {
    EXAMPLE_PROMPTS.iter().map(|s| (*s).to_string()).collect()
}

/// How the completion endpoint frames its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// Plain streamed text body; request is `{"messages": [...]}`.
    TextStream,
    /// OpenAI chat completions with server-sent events.
    #[default]
    #[serde(rename = "openai_chat")]
    OpenAiChat,
}

impl WireFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            WireFormat::TextStream => "text-stream",
            WireFormat::OpenAiChat => "openai-chat",
        }
    }
}

impl FromStr for WireFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "text-stream" | "text" => Ok(WireFormat::TextStream),
            "openai-chat" | "openai" => Ok(WireFormat::OpenAiChat),
            _ => Err(ConfigError::Invalid(format!("unknown wire format: {s}"))),
        }
    }
}

/// Icon glyph set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IconMode {
    /// Nerd Font icons (default, richest experience).
    #[default]
    Nerd,
    /// Standard Unicode symbols (wide compatibility).
    Unicode,
    /// ASCII-only fallback (maximum compatibility, also used with `NO_COLOR`).
    Ascii,
}

/// Connection details for the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL (OpenAI format) or full URL (text stream format).
    #[serde(default = "default_url")]
    pub url: String,

    /// Response framing.
    #[serde(default)]
    pub format: WireFormat,

    /// Model name sent with OpenAI-format requests.
    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the bearer token.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,

    /// Whole-request timeout in seconds, streaming included.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-3.5-turbo".into()
}

#[allow(clippy::unnecessary_wraps)]
fn default_api_key_env() -> Option<String> {
    Some("OPENAI_API_KEY".into())
}

fn default_timeout() -> u64 {
    300
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            format: WireFormat::default(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            system_prompt: None,
            icons: IconMode::default(),
            examples: default_examples(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit path must exist. Without one, `howdy.json` in `cwd` is
    /// used when present, otherwise defaults. Environment overrides are
    /// applied last.
    pub fn resolve(explicit: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let candidate: PathBuf = cwd.join(DEFAULT_CONFIG_FILE);
                if candidate.exists() {
                    Self::load(&candidate)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply environment overrides using the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_ENDPOINT).filter(|v| !v.is_empty()) {
            self.endpoint.url = url;
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.is_empty()) {
            self.endpoint.model = model;
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A value outside the accepted set.
    #[error("Invalid value: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.endpoint.format, WireFormat::OpenAiChat);
        assert_eq!(config.endpoint.model, "gpt-3.5-turbo");
        assert_eq!(config.endpoint.api_key_env.as_deref(), Some("OPENAI_API_KEY"));
        assert_eq!(config.icons, IconMode::Nerd);
        assert_eq!(config.examples.len(), 3);
    }

    #[test]
    fn test_empty_object_is_default() {
        let parsed: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_endpoint() {
        let parsed: Config = serde_json::from_str(
            r#"{"endpoint": {"url": "http://localhost:3000/api/chat", "format": "text_stream"}, "icons": "ascii"}"#,
        )
        .unwrap();
        assert_eq!(parsed.endpoint.url, "http://localhost:3000/api/chat");
        assert_eq!(parsed.endpoint.format, WireFormat::TextStream);
        assert_eq!(parsed.endpoint.timeout_seconds, 300);
        assert_eq!(parsed.icons, IconMode::Ascii);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("howdy.json");

        let mut config = Config::default();
        config.system_prompt = Some("You are HOWDY.".into());
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_resolve_prefers_cwd_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"{"endpoint": {"model": "gpt-4"}}"#,
        )
        .unwrap();

        let config = Config::resolve(None, dir.path()).unwrap();
        assert_eq!(config.endpoint.model, "gpt-4");
    }

    #[test]
    fn test_resolve_missing_explicit_path_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            Config::resolve(Some(&missing), dir.path()),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_resolve_bad_json_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::resolve(Some(&path), dir.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|name| match name {
            ENV_ENDPOINT => Some("http://localhost:11434/v1".into()),
            ENV_MODEL => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.endpoint.url, "http://localhost:11434/v1");
        // Empty values are ignored
        assert_eq!(config.endpoint.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_wire_format_serde_names() {
        assert_eq!(
            serde_json::to_string(&WireFormat::OpenAiChat).unwrap(),
            r#""openai_chat""#
        );
        assert_eq!(
            serde_json::to_string(&WireFormat::TextStream).unwrap(),
            r#""text_stream""#
        );
    }

    #[test]
    fn test_wire_format_from_str() {
        assert_eq!("text-stream".parse::<WireFormat>().unwrap(), WireFormat::TextStream);
        assert_eq!("openai_chat".parse::<WireFormat>().unwrap(), WireFormat::OpenAiChat);
        assert_eq!("OpenAI".parse::<WireFormat>().unwrap(), WireFormat::OpenAiChat);
        assert!("grpc".parse::<WireFormat>().is_err());
    }
}
