use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from file '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Invalid bind address '{0}'")]
    InvalidBind(String),
    #[error("Invalid CORS origin '{0}'")]
    InvalidOrigin(String),
}

/// Failure to run an external tool at all. An unexpected exit status is not a
/// `ToolError`; callers inspect `ToolOutput::status` for that.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("'{program}' is not installed or not on PATH")]
    Missing { program: String },
    #[error("Command '{command}' timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort a review request before any analysis runs.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("No code provided.")]
    NoCode,
    #[error("Failed to prepare workspace: {0}")]
    Workspace(#[source] std::io::Error),
}

/// Failure of one tier of the chat fallback chain.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Chat request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Chat service responded with error {0}: {1}")]
    ApiResponseError(reqwest::StatusCode, String),
    #[error("Chat service returned an empty reply.")]
    EmptyMessage,
    #[error("Chat service response contained no choices.")]
    NoChoiceInResponse,
    #[error("API key variable '{0}' is not set")]
    MissingApiKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_messages() {
        let missing = ToolError::Missing {
            program: "ruff".to_string(),
        };
        assert_eq!(missing.to_string(), "'ruff' is not installed or not on PATH");

        let timeout = ToolError::Timeout {
            command: "python3 /tmp/x.py".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(
            timeout.to_string(),
            "Command 'python3 /tmp/x.py' timed out after 5s"
        );
    }

    #[test]
    fn test_review_error_message_is_user_facing() {
        assert_eq!(ReviewError::NoCode.to_string(), "No code provided.");
    }
}
