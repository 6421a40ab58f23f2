//! Settings configuration loaded from TOML files.
//!
//! Non-sensitive configuration lives in the XDG config directory
//! (`~/.config/agent-smith/config.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default TOML configuration file content
const DEFAULT_CONFIG_TOML: &str = r#"# agent-smith configuration file
# Located at: ~/.config/agent-smith/config.toml
#
# This file contains non-sensitive configuration.
# Secrets (API keys) are loaded from environment variables:
#   - OPENAI_API_KEY

[model]
base_url = "https://api.openai.com/v1"
completion_model = "gpt-3.5-turbo"
temperature = 0.5
image_model = "dall-e-3"
image_size = "1024x1024"
timeout_seconds = 120

[knowledge]
default_base = "system"
embedding_url = "https://api.openai.com/v1"
embedding_model = "text-embedding-ada-002"
# root = "/srv/agent-smith/kb"  # facts/ and embeddings/ live below this

[agents]
cli = true
web = false

[gateway]
host = "127.0.0.1"
port = 8080

[logging]
level = "info"
"#;

/// Settings loaded from TOML configuration file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    /// Language-model service settings
    #[serde(default)]
    pub model: ModelSettings,

    /// Knowledge base storage and embedding settings
    #[serde(default)]
    pub knowledge: KnowledgeSection,

    /// Which front-ends to launch
    #[serde(default)]
    pub agents: AgentsSettings,

    /// HTTP front-end configuration
    #[serde(default)]
    pub gateway: GatewaySettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Completion and image generation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelSettings {
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_model_base_url")]
    pub base_url: String,

    /// Chat completion model identifier
    #[serde(default = "default_completion_model")]
    pub completion_model: String,

    /// Sampling temperature for completions
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Image generation model identifier
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Requested image size (e.g. "1024x1024")
    #[serde(default = "default_image_size")]
    pub image_size: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// User-facing `[knowledge]` section. Resolved into
/// [`KnowledgeSettings`](super::KnowledgeSettings) before use.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KnowledgeSection {
    /// Storage root holding `facts/` and `embeddings/`
    pub root: Option<String>,

    /// Knowledge base selected at startup
    pub default_base: Option<String>,

    /// Embedding provider base URL
    pub embedding_url: Option<String>,

    /// Embedding model name
    pub embedding_model: Option<String>,
}

/// Front-end toggles
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentsSettings {
    /// Interactive stdin/stdout agent
    #[serde(default = "default_true")]
    pub cli: bool,

    /// HTTP agent served on `[gateway]`
    #[serde(default)]
    pub web: bool,
}

/// Gateway server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewaySettings {
    /// Host to bind to
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions

fn default_model_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_completion_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.5
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

fn default_true() -> bool {
    true
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: default_model_base_url(),
            completion_model: default_completion_model(),
            temperature: default_temperature(),
            image_model: default_image_model(),
            image_size: default_image_size(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for AgentsSettings {
    fn default() -> Self {
        Self {
            cli: true,
            web: false,
        }
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config directory not found")]
    ConfigDirNotFound,
}

impl Settings {
    /// Load settings from the TOML configuration file.
    ///
    /// If the config file doesn't exist, creates it with default values.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from_path(&Self::config_path()?)
    }

    /// Load settings from `path`, writing the default file there first if
    /// it is missing.
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::info!("Creating default configuration at {:?}", path);
            Self::create_default_config(path)?;
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        Ok(settings)
    }

    /// Get the configuration file path.
    ///
    /// Uses `AGENT_SMITH_CONFIG_DIR` when set, the XDG config directory otherwise.
    pub fn config_path() -> Result<PathBuf, SettingsError> {
        if let Ok(override_dir) = std::env::var("AGENT_SMITH_CONFIG_DIR") {
            let dir = PathBuf::from(override_dir);
            return Ok(dir.join("config.toml"));
        }

        let config_dir = dirs::config_dir()
            .ok_or(SettingsError::ConfigDirNotFound)?
            .join("agent-smith");

        Ok(config_dir.join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, DEFAULT_CONFIG_TOML)?;

        Ok(())
    }

    /// Get the HTTP bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.gateway.host, self.gateway.port)
    }
}
