//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

const KEYRING_SERVICE: &str = "relaybot";

/// Nested Slack configuration for Socket Mode connectivity.
///
/// Tokens are loaded at runtime via OS keychain or environment variables,
/// not from the TOML config file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SlackConfig {
    /// Channel that receives the reply to the starting prompt, if any.
    #[serde(default)]
    pub channel_id: Option<String>,
    /// App-level token used for Socket Mode (populated at runtime).
    #[serde(skip)]
    pub app_token: String,
    /// Bot user token used for posting messages (populated at runtime).
    #[serde(skip)]
    pub bot_token: String,
}

/// Chat completion settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ChatConfig {
    /// Base URL of the Messages API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Upper bound on generated tokens per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature in `[0.0, 1.0]`.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// System prompt sent with every request.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// API key (populated at runtime).
    #[serde(skip)]
    pub api_key: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
            api_key: String::new(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.anthropic.com".into()
}

fn default_model() -> String {
    "claude-3-5-sonnet-20240620".into()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_system_prompt() -> String {
    "You are Claude, an AI assistant.".into()
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Slack connectivity settings.
    #[serde(default)]
    pub slack: SlackConfig,
    /// Chat completion settings.
    #[serde(default)]
    pub chat: ChatConfig,
    /// Start with replies visible only to the requester.
    #[serde(default)]
    pub private_by_default: bool,
    /// Text file sent to the chat backend once at startup. The reply is
    /// posted to `slack.channel_id`.
    #[serde(default)]
    pub starting_prompt: Option<PathBuf>,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load Slack and chat credentials from OS keychain with env-var fallback.
    ///
    /// Tries the `relaybot` keyring service first, then falls back to
    /// `SLACK_APP_TOKEN`, `SLACK_BOT_TOKEN` and `ANTHROPIC_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither keychain nor env vars provide
    /// a required credential.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.slack.app_token = load_credential("slack_app_token", "SLACK_APP_TOKEN").await?;
        self.slack.bot_token = load_credential("slack_bot_token", "SLACK_BOT_TOKEN").await?;
        self.chat.api_key = load_credential("anthropic_api_key", "ANTHROPIC_API_KEY").await?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.chat.model.trim().is_empty() {
            return Err(AppError::Config("chat.model must not be empty".into()));
        }

        if self.chat.max_tokens == 0 {
            return Err(AppError::Config(
                "chat.max_tokens must be greater than zero".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.chat.temperature) {
            return Err(AppError::Config(
                "chat.temperature must be between 0.0 and 1.0".into(),
            ));
        }

        if self
            .slack
            .channel_id
            .as_deref()
            .is_some_and(|id| id.trim().is_empty())
        {
            return Err(AppError::Config(
                "slack.channel_id must not be blank when set".into(),
            ));
        }

        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    env::var(env_key).map_err(|_| {
        AppError::Config(format!(
            "credential {keyring_key} not found in keychain or {env_key} env var"
        ))
    })
}
