use std::time::Duration;

use crate::config::ChatConfig;
use crate::errors::ChatError;
use crate::types::chat::{OllamaGenerateRequest, OllamaGenerateResponse, OllamaOptions};

use super::{clean_ai_output, preview};

/// Prompt sent when the conversation has no user message.
const DEFAULT_PROMPT: &str = "Hello";

/// Client for a local Ollama `/api/generate` endpoint.
pub struct OllamaClient {
    client: reqwest::Client,
    url: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(client: reqwest::Client, config: &ChatConfig) -> Self {
        Self {
            client,
            url: config.ollama_url.clone(),
            model: config.ollama_model.clone(),
            temperature: config.temperature,
            timeout: Duration::from_secs(config.ollama_timeout_secs),
        }
    }

    /// Single non-streaming completion for `prompt`.
    pub async fn generate(&self, prompt: &str) -> Result<String, ChatError> {
        let payload = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: if prompt.is_empty() {
                DEFAULT_PROMPT.to_string()
            } else {
                prompt.to_string()
            },
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        tracing::debug!(url = %self.url, model = %self.model, "Sending prompt to Ollama");
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Ollama HTTP error: {} {}", status, preview(&body, 200));
            return Err(ChatError::ApiResponseError(status, body));
        }

        let data: OllamaGenerateResponse = response.json().await?;
        let reply = clean_ai_output(data.response.as_deref().unwrap_or_default());
        if reply.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        Ok(reply)
    }
}
