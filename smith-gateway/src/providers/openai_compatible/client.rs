//! OpenAI-compatible API client.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use smith_core::ModelSettings;
use tracing::warn;

use crate::providers::provider::{Provider, ProviderError};

const ROLE_SYSTEM: &str = "system";

/// OpenAI-compatible API client.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f32,
    image_model: String,
    image_size: String,
}

/// Request body for the Chat Completions API
#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl OpenAiCompatibleClient {
    /// Create a client for the endpoints configured in `[model]`.
    pub fn new(settings: &ModelSettings, api_key: Option<String>) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            http_client,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.completion_model.clone(),
            temperature: settings.temperature,
            image_model: settings.image_model.clone(),
            image_size: settings.image_size.clone(),
        })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http_client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            warn!(%status, path, "language model request failed");
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .ok()
                .and_then(|envelope| envelope.error)
                .map(|error| error.message)
                .unwrap_or_else(|| format!("{status}: {text}"));
            return Err(ProviderError::ApiError { message });
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ApiError>,
}

#[async_trait::async_trait]
impl Provider for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        "openai_compatible"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<Vec<String>, ProviderError> {
        let request = ChatCompletionsRequest {
            model: &self.model,
            messages: vec![OpenAiMessage {
                role: ROLE_SYSTEM,
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let body = self.post("/chat/completions", &request).await?;
        let response: ChatCompletionsResponse = serde_json::from_str(&body)?;
        if let Some(error) = response.error {
            return Err(ProviderError::ApiError {
                message: error.message,
            });
        }

        let completions: Vec<String> = response
            .choices
            .into_iter()
            .map(|choice| choice.message.content.unwrap_or_default())
            .collect();
        if completions.is_empty() {
            return Err(ProviderError::NoContent);
        }
        Ok(completions)
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<String>, ProviderError> {
        let request = ImageRequest {
            model: &self.image_model,
            prompt,
            n: 1,
            size: &self.image_size,
        };

        let body = self.post("/images/generations", &request).await?;
        let response: ImageResponse = serde_json::from_str(&body)?;
        if let Some(error) = response.error {
            return Err(ProviderError::ApiError {
                message: error.message,
            });
        }

        let urls: Vec<String> = response
            .data
            .into_iter()
            .filter_map(|image| image.url)
            .collect();
        if urls.is_empty() {
            return Err(ProviderError::NoContent);
        }
        Ok(urls)
    }
}
