//! Secrets configuration loaded from environment variables only.
//!
//! API keys never live in the TOML settings file. They are read from the
//! process environment (optionally seeded from a `.env` file).

use std::env;

/// Secrets loaded exclusively from environment variables.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    /// OpenAI (or compatible) API key (env: OPENAI_API_KEY)
    pub openai_api_key: Option<String>,
}

/// Errors that can occur when loading secrets
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("No language model API key configured. Set OPENAI_API_KEY")]
    NoProviderConfigured,
}

impl Secrets {
    /// Load secrets from environment variables.
    ///
    /// Loads a `.env` file first if one is present (development convenience).
    pub fn from_env() -> Result<Self, SecretsError> {
        let _ = dotenvy::dotenv();

        Self::from_env_inner()
    }

    /// Internal method to load from environment without loading .env
    pub(crate) fn from_env_inner() -> Result<Self, SecretsError> {
        let secrets = Self {
            openai_api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
        };

        if secrets.openai_api_key.is_none() {
            return Err(SecretsError::NoProviderConfigured);
        }

        Ok(secrets)
    }
}
