use serde::{Deserialize, Serialize};

/// Represents a chat message with a role and content
///
/// Used both for the incoming conversation and for requests to the hosted
/// chat-completion API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// A message as submitted by the browser; both fields may be absent.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct IncomingMessage {
    pub role: Option<String>,
    pub content: Option<String>,
}

/// Body of `POST /chat`.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ChatRequest {
    pub messages: Option<Vec<IncomingMessage>>,
}

impl ChatRequest {
    /// Content of the most recent `user` message, trimmed. Empty when there is none.
    pub fn last_user_message(&self) -> String {
        self.messages
            .iter()
            .flatten()
            .rev()
            .find(|m| m.role.as_deref() == Some("user"))
            .and_then(|m| m.content.as_deref())
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    /// History normalised for the hosted API: missing roles become `user`,
    /// empty messages are dropped.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .flatten()
            .filter_map(|m| {
                let content = m.content.as_deref().unwrap_or_default().trim();
                if content.is_empty() {
                    return None;
                }
                let role = match m.role.as_deref() {
                    Some(r) if !r.is_empty() => r,
                    _ => "user",
                };
                Some(ChatMessage::new(role, content))
            })
            .collect()
    }
}

/// Which tier of the fallback chain produced a reply.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatSource {
    Ollama,
    #[serde(rename = "openai")]
    OpenAi,
    Echo,
}

impl std::fmt::Display for ChatSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatSource::Ollama => write!(f, "ollama"),
            ChatSource::OpenAi => write!(f, "openai"),
            ChatSource::Echo => write!(f, "echo"),
        }
    }
}

/// Body returned by `POST /chat`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
    pub source: ChatSource,
}

// OpenAI chat-completion wire types

#[derive(Serialize, Debug, Clone)]
pub struct OpenAIChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

// Ollama generate wire types

#[derive(Serialize, Debug, Clone)]
pub struct OllamaGenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: OllamaOptions,
}

#[derive(Serialize, Debug, Clone)]
pub struct OllamaOptions {
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaGenerateResponse {
    #[serde(default)]
    pub response: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> ChatRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_last_user_message_picks_most_recent_user() {
        let req = request(
            r#"{"messages":[
                {"role":"user","content":"first"},
                {"role":"assistant","content":"hi"},
                {"role":"user","content":"  second  "},
                {"role":"assistant","content":"ok"}
            ]}"#,
        );
        assert_eq!(req.last_user_message(), "second");
    }

    #[test]
    fn test_last_user_message_empty_without_user() {
        assert_eq!(request("{}").last_user_message(), "");
        assert_eq!(request(r#"{"messages":null}"#).last_user_message(), "");
        assert_eq!(
            request(r#"{"messages":[{"role":"assistant","content":"x"}]}"#).last_user_message(),
            ""
        );
    }

    #[test]
    fn test_history_normalises_roles_and_skips_empty() {
        let req = request(
            r#"{"messages":[
                {"content":"no role"},
                {"role":"assistant","content":"   "},
                {"role":"assistant","content":"answer"}
            ]}"#,
        );
        assert_eq!(
            req.history(),
            vec![
                ChatMessage::new("user", "no role"),
                ChatMessage::new("assistant", "answer"),
            ]
        );
    }

    #[test]
    fn test_chat_source_serialization() {
        assert_eq!(serde_json::to_value(ChatSource::OpenAi).unwrap(), "openai");
        assert_eq!(serde_json::to_value(ChatSource::Ollama).unwrap(), "ollama");
        assert_eq!(serde_json::to_value(ChatSource::Echo).unwrap(), "echo");
    }
}
