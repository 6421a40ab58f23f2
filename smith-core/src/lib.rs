pub mod config;
pub mod error;
pub mod message;

// Config re-exports
pub use config::{
    AgentsSettings, Config, ConfigError, GatewaySettings, KnowledgeSettings, LoggingSettings,
    ModelSettings, Secrets, SecretsError, Settings, SettingsError,
};

pub use error::ErrorKind;

// Message re-exports
pub use message::{Answer, Question, User};
