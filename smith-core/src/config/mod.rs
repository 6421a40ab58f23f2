//! Configuration management for agent-smith.
//!
//! Secrets come from environment variables, settings from a TOML file.
//!
//! # Configuration Sources
//!
//! ## Secrets (Environment Variables)
//! - `OPENAI_API_KEY` - key for the completion, image and embedding endpoints
//!
//! ## Settings (TOML File)
//! Located at `~/.config/agent-smith/config.toml` (or `$AGENT_SMITH_CONFIG_DIR/config.toml`):
//! ```toml
//! [model]
//! completion_model = "gpt-3.5-turbo"
//!
//! [knowledge]
//! default_base = "system"
//!
//! [agents]
//! cli = true
//! web = false
//!
//! [gateway]
//! host = "127.0.0.1"
//! port = 8080
//! ```

pub mod knowledge;
mod secrets;
mod settings;

pub use knowledge::KnowledgeSettings;
pub use secrets::{Secrets, SecretsError};
pub use settings::{
    AgentsSettings, GatewaySettings, KnowledgeSection, LoggingSettings, ModelSettings, Settings,
    SettingsError,
};

#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Combined configuration containing both secrets and settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secrets loaded from environment variables
    pub secrets: Secrets,
    /// Settings loaded from TOML configuration file
    pub settings: Settings,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Secrets error: {0}")]
    Secrets(#[from] SecretsError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("No agent enabled. Set [agents] cli or web to true")]
    NoAgentEnabled,

    #[error("Invalid temperature {0}; expected a value between 0 and 2")]
    InvalidTemperature(f32),
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing, the TOML file cannot be
    /// read or parsed, or the settings fail validation.
    pub fn load() -> Result<Self, ConfigError> {
        let secrets = Secrets::from_env()?;
        let settings = Settings::load()?;
        Self::from_parts(secrets, settings)
    }

    /// Validate and combine already loaded secrets and settings.
    pub fn from_parts(secrets: Secrets, settings: Settings) -> Result<Self, ConfigError> {
        if !settings.agents.cli && !settings.agents.web {
            return Err(ConfigError::NoAgentEnabled);
        }

        let temperature = settings.model.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidTemperature(temperature));
        }

        Ok(Self { secrets, settings })
    }

    /// Resolved knowledge settings.
    pub fn knowledge_settings(&self) -> KnowledgeSettings {
        KnowledgeSettings::from(&self.settings.knowledge)
    }

    /// Get the HTTP bind address.
    pub fn bind_addr(&self) -> String {
        self.settings.bind_addr()
    }

    /// Get the OpenAI API key (if configured).
    pub fn openai_api_key(&self) -> Option<&str> {
        self.secrets.openai_api_key.as_deref()
    }

    pub fn cli_enabled(&self) -> bool {
        self.settings.agents.cli
    }

    pub fn web_enabled(&self) -> bool {
        self.settings.agents.web
    }
}
