use std::time::Duration;

use crate::config::ChatConfig;
use crate::errors::ChatError;
use crate::types::chat::{ChatMessage, OpenAIChatCompletionResponse, OpenAIChatRequest};

use super::{clean_ai_output, preview};

/// Client for an OpenAI-compatible chat-completion API.
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    system_prompt: String,
    temperature: f32,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(client: reqwest::Client, config: &ChatConfig, api_key: String) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/chat/completions",
                config.openai_base_url.trim_end_matches('/')
            ),
            model: config.openai_model.clone(),
            api_key,
            system_prompt: config.system_prompt.clone(),
            temperature: config.temperature,
            timeout: Duration::from_secs(config.openai_timeout_secs),
        }
    }

    /// Complete `history`, prefixed with the configured system instruction.
    pub async fn complete(&self, history: Vec<ChatMessage>) -> Result<String, ChatError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::new("system", self.system_prompt.clone()));
        messages.extend(history);

        let request_payload = OpenAIChatRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(self.temperature),
        };

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "Sending chat completion request");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request_payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status_code = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body from AI response".to_string());
            tracing::warn!("OpenAI request failed, status {}: {}", status_code, preview(&body, 200));
            return Err(ChatError::ApiResponseError(status_code, body));
        }

        let response_data: OpenAIChatCompletionResponse = response.json().await?;
        let choice = response_data
            .choices
            .into_iter()
            .next()
            .ok_or(ChatError::NoChoiceInResponse)?;
        let content = clean_ai_output(choice.message.content.as_deref().unwrap_or_default());
        if content.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        Ok(content)
    }
}
