//! OpenAI Provider
//!
//! Implementation of the Model trait against the chat completions and image
//! generation endpoints.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::provider::{provider_error, Model};
use super::types::{ChatMessage, Completion, ErrorResponse, ModelConfig, ModelOutcome};
use crate::http_client::build_http_client;

/// GPT model provider
pub struct GptModel {
    config: ModelConfig,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: String,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: Option<ProviderErrorDetail>,
}

#[derive(Deserialize)]
struct ProviderErrorDetail {
    message: Option<String>,
}

impl GptModel {
    /// Create a new provider with the given configuration
    pub fn new(config: ModelConfig) -> Self {
        let client = build_http_client();
        Self { config, client }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Pull the provider's own error message out of a failure body, falling
    /// back to the raw body text.
    fn error_message(body: &str) -> String {
        serde_json::from_str::<ProviderErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.error)
            .and_then(|error| error.message)
            .unwrap_or_else(|| body.to_string())
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<String, ErrorResponse> {
        let response = self
            .client
            .post(self.endpoint(path))
            .header("Accept", "application/json")
            .header("OpenAI-Organization", &self.config.organization)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ErrorResponse::generic(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ErrorResponse::generic(e.to_string()))?;

        if !status.is_success() {
            let message = Self::error_message(&text);
            warn!(status = status.as_u16(), %message, "provider request failed");
            return Err(provider_error(status.as_u16(), message));
        }

        Ok(text)
    }
}

#[async_trait]
impl Model for GptModel {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn request(&self, messages: Vec<ChatMessage>) -> ModelOutcome {
        debug!(
            model = %self.config.model,
            temperature = self.config.temperature,
            messages = messages.len(),
            "requesting completion"
        );

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": self.config.temperature,
        });

        let text = self.post("chat/completions", body).await?;

        let completion: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| ErrorResponse::generic(format!("malformed completion: {e}")))?;

        Ok(Completion {
            choices: completion
                .choices
                .into_iter()
                .map(|choice| {
                    choice
                        .message
                        .and_then(|message| message.content)
                        .unwrap_or_default()
                })
                .collect(),
        })
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, ErrorResponse> {
        debug!(prompt_len = prompt.len(), "requesting image");

        let body = serde_json::json!({
            "prompt": prompt,
            "n": 1,
            "size": "512x512",
            "response_format": "url",
        });

        let text = self.post("images/generations", body).await?;

        let images: ImagesResponse = serde_json::from_str(&text)
            .map_err(|e| ErrorResponse::generic(format!("malformed image response: {e}")))?;

        images
            .data
            .into_iter()
            .next()
            .map(|image| image.url)
            .ok_or_else(|| ErrorResponse::generic("image response without data"))
    }
}
