//! Conversational assistant with a three-tier fallback:
//! local Ollama, then the hosted OpenAI API, then a deterministic echo.

use async_trait::async_trait;

use crate::clients::{OllamaClient, OpenAiClient};
use crate::config::ChatConfig;
use crate::errors::ChatError;
use crate::types::chat::{ChatReply, ChatRequest, ChatSource};

/// One tier of the fallback chain.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn source(&self) -> ChatSource;

    async fn reply(&self, request: &ChatRequest) -> Result<String, ChatError>;
}

pub struct OllamaProvider {
    client: OllamaClient,
}

#[async_trait]
impl ChatProvider for OllamaProvider {
    fn source(&self) -> ChatSource {
        ChatSource::Ollama
    }

    async fn reply(&self, request: &ChatRequest) -> Result<String, ChatError> {
        self.client.generate(&request.last_user_message()).await
    }
}

pub struct OpenAiProvider {
    client: OpenAiClient,
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn source(&self) -> ChatSource {
        ChatSource::OpenAi
    }

    async fn reply(&self, request: &ChatRequest) -> Result<String, ChatError> {
        self.client.complete(request.history()).await
    }
}

/// Last resort; never fails.
pub struct EchoProvider;

impl EchoProvider {
    pub fn echo(request: &ChatRequest) -> String {
        format!("You said: {}", request.last_user_message())
    }
}

#[async_trait]
impl ChatProvider for EchoProvider {
    fn source(&self) -> ChatSource {
        ChatSource::Echo
    }

    async fn reply(&self, request: &ChatRequest) -> Result<String, ChatError> {
        Ok(Self::echo(request))
    }
}

pub struct ChatService {
    config: ChatConfig,
    client: reqwest::Client,
}

impl ChatService {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Tiers in the order they are tried. The API key is read now, so a key
    /// exported after startup is picked up by the next request.
    pub fn providers(&self) -> Vec<Box<dyn ChatProvider>> {
        let mut providers: Vec<Box<dyn ChatProvider>> = vec![Box::new(OllamaProvider {
            client: OllamaClient::new(self.client.clone(), &self.config),
        })];

        match self.config.openai_api_key() {
            Some(api_key) => providers.push(Box::new(OpenAiProvider {
                client: OpenAiClient::new(self.client.clone(), &self.config, api_key),
            })),
            None => tracing::debug!(
                "{}",
                ChatError::MissingApiKey(self.config.openai_api_key_env.clone())
            ),
        }

        providers.push(Box::new(EchoProvider));
        providers
    }

    /// First successful tier wins; failures are logged and skipped.
    pub async fn respond(&self, request: &ChatRequest) -> ChatReply {
        respond_with(&self.providers(), request).await
    }
}

pub async fn respond_with(providers: &[Box<dyn ChatProvider>], request: &ChatRequest) -> ChatReply {
    for provider in providers {
        match provider.reply(request).await {
            Ok(reply) => {
                tracing::info!(source = %provider.source(), "Chat reply produced");
                return ChatReply {
                    reply,
                    source: provider.source(),
                };
            }
            Err(e) => {
                tracing::warn!(source = %provider.source(), "Chat tier failed: {}", e);
            }
        }
    }

    ChatReply {
        reply: EchoProvider::echo(request),
        source: ChatSource::Echo,
    }
}
