use serde::Deserialize;
use std::{
    collections::HashMap,
    env,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::errors::ConfigError;

// Configuration location
const USER_CONFIG_DIR: &str = "code-reviewer";
const CONFIG_FILE_NAME: &str = "config.toml";

// Environment overrides
const ENV_BIND: &str = "CODE_REVIEWER_BIND";
const ENV_OLLAMA_URL: &str = "OLLAMA_URL";
const ENV_OLLAMA_MODEL: &str = "OLLAMA_MODEL";
const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";

/// HTTP server configuration
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Origins allowed by the CORS policy
    pub cors_origins: Vec<String>,
    /// Maximum accepted request body, in bytes
    pub body_limit: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5001".to_string(),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            body_limit: 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .parse()
            .map_err(|_| ConfigError::InvalidBind(self.bind.clone()))
    }
}

/// External analysis tools and their time budgets
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ToolsConfig {
    pub ruff: String,
    pub radon: String,
    pub bandit: String,
    /// Interpreter used by the syntax check and the execution sandbox
    pub interpreter: String,
    pub syntax_timeout_secs: u64,
    pub lint_timeout_secs: u64,
    pub metrics_timeout_secs: u64,
    pub security_timeout_secs: u64,
    pub sandbox_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ruff: "ruff".to_string(),
            radon: "radon".to_string(),
            bandit: "bandit".to_string(),
            interpreter: "python3".to_string(),
            syntax_timeout_secs: 10,
            lint_timeout_secs: 20,
            metrics_timeout_secs: 20,
            security_timeout_secs: 30,
            sandbox_timeout_secs: 5,
        }
    }
}

impl ToolsConfig {
    pub fn syntax_timeout(&self) -> Duration {
        Duration::from_secs(self.syntax_timeout_secs)
    }

    pub fn lint_timeout(&self) -> Duration {
        Duration::from_secs(self.lint_timeout_secs)
    }

    pub fn metrics_timeout(&self) -> Duration {
        Duration::from_secs(self.metrics_timeout_secs)
    }

    pub fn security_timeout(&self) -> Duration {
        Duration::from_secs(self.security_timeout_secs)
    }

    pub fn sandbox_timeout(&self) -> Duration {
        Duration::from_secs(self.sandbox_timeout_secs)
    }
}

/// Chat fallback chain configuration
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ChatConfig {
    pub ollama_url: String,
    pub ollama_model: String,
    pub ollama_timeout_secs: u64,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_timeout_secs: u64,
    /// Name of the environment variable holding the OpenAI key. The key itself
    /// is read at request time and never stored.
    pub openai_api_key_env: String,
    pub temperature: f32,
    pub system_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://127.0.0.1:11434/api/generate".to_string(),
            ollama_model: "llama3.2:3b".to_string(),
            ollama_timeout_secs: 60,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_timeout_secs: 60,
            openai_api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.3,
            system_prompt: "You are a helpful coding assistant. Keep answers short.".to_string(),
        }
    }
}

impl ChatConfig {
    /// Current value of the configured API key variable, if set and non-empty.
    pub fn openai_api_key(&self) -> Option<String> {
        env::var(&self.openai_api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Application configuration
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub tools: ToolsConfig,
    pub chat: ChatConfig,
}

impl AppConfig {
    /// Default location of the user configuration file.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(USER_CONFIG_DIR).join(CONFIG_FILE_NAME))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the user config file is
    /// read when present and built-in defaults are used otherwise. Environment
    /// overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_config_from_file(path)?,
            None => match Self::default_config_path() {
                Some(default_path) if default_path.exists() => {
                    Self::load_config_from_file(&default_path)?
                }
                _ => {
                    tracing::info!("No configuration file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides(&env::vars().collect());
        config.validate()?;
        Ok(config)
    }

    fn load_config_from_file(config_path: &Path) -> Result<Self, ConfigError> {
        tracing::info!("Reading configuration file: {:?}", config_path);

        let config_content = std::fs::read_to_string(config_path).map_err(|e| {
            tracing::error!("Failed to read configuration file {:?}: {}", config_path, e);
            ConfigError::FileRead(config_path.to_string_lossy().to_string(), e)
        })?;

        toml::from_str(&config_content).map_err(|e| {
            tracing::error!("Failed to parse configuration file {:?}: {}", config_path, e);
            ConfigError::TomlParse(config_path.to_string_lossy().to_string(), e)
        })
    }

    /// Apply overrides from a pre-fetched environment map.
    pub fn apply_env_overrides(&mut self, env_map: &HashMap<String, String>) {
        let lookup = |key: &str| env_map.get(key).filter(|v| !v.is_empty()).cloned();

        if let Some(bind) = lookup(ENV_BIND) {
            self.server.bind = bind;
        }
        if let Some(url) = lookup(ENV_OLLAMA_URL) {
            self.chat.ollama_url = url;
        }
        if let Some(model) = lookup(ENV_OLLAMA_MODEL) {
            self.chat.ollama_model = model;
        }
        if let Some(url) = lookup(ENV_OPENAI_BASE_URL) {
            self.chat.openai_base_url = url;
        }
        if let Some(model) = lookup(ENV_OPENAI_MODEL) {
            self.chat.openai_model = model;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;
        for origin in &self.server.cors_origins {
            if !origin.starts_with("http://") && !origin.starts_with("https://") {
                return Err(ConfigError::InvalidOrigin(origin.clone()));
            }
        }
        Ok(())
    }
}
