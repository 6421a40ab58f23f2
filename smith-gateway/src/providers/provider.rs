//! Provider trait for the language-model service.

use smith_core::ErrorKind;

/// Provider error types
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {message}")]
    ApiError { message: String },
    #[error("No content in response")]
    NoContent,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ExternalService
    }
}

/// Completion and image generation backend.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Current completion model
    fn model(&self) -> &str;

    /// One text per returned choice.
    async fn complete(&self, prompt: &str) -> Result<Vec<String>, ProviderError>;

    /// URLs of the generated images.
    async fn generate_image(&self, prompt: &str) -> Result<Vec<String>, ProviderError>;

    /// First completion, or [`ProviderError::NoContent`].
    async fn complete_one(&self, prompt: &str) -> Result<String, ProviderError> {
        self.complete(prompt)
            .await?
            .into_iter()
            .next()
            .ok_or(ProviderError::NoContent)
    }
}
