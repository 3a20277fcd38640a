//! Chat completion backend (Anthropic Messages API).

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ChatConfig;
use crate::provider::{classify_status, ProviderError};
use crate::Result;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Single-turn chat completion.
pub trait ChatBackend: Send + Sync {
    /// Complete `prompt` and return the assistant's text.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Provider`](crate::AppError::Provider) describing
    /// why the upstream call failed.
    fn complete(&self, prompt: String) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>>;
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// [`ChatBackend`] backed by the Anthropic Messages API.
pub struct AnthropicChat {
    http: reqwest::Client,
    config: ChatConfig,
}

impl AnthropicChat {
    /// Create a backend sharing the given HTTP client.
    #[must_use]
    pub fn new(http: reqwest::Client, config: ChatConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.api_base.trim_end_matches('/'))
    }

    async fn send(&self, prompt: &str) -> Result<String> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: &self.config.system_prompt,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model = %self.config.model, prompt_len = prompt.len(), "sending chat request");
        let response = self
            .http
            .post(self.endpoint())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|err| ProviderError::Connection(err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| ProviderError::Connection(err.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(classify_status(status, error_message(&body)).into());
        }

        let text = extract_text(&body)?;
        info!(reply_len = text.len(), "chat completion received");
        Ok(text)
    }
}

impl ChatBackend for AnthropicChat {
    fn complete(
        &self,
        prompt: String,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        Box::pin(async move { self.send(&prompt).await })
    }
}

/// Pull the provider's error message out of a JSON error body, falling back
/// to the raw body.
#[must_use]
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_owned())
}

/// Concatenate the text blocks of a successful Messages API response.
///
/// # Errors
///
/// Returns `ProviderError::MalformedResponse` if the body is not valid JSON
/// or carries no text block.
pub fn extract_text(body: &str) -> Result<String> {
    let parsed: MessagesResponse = serde_json::from_str(body)
        .map_err(|err| ProviderError::MalformedResponse(format!("invalid json: {err}")))?;

    let text: Vec<String> = parsed
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();

    if text.is_empty() {
        return Err(ProviderError::MalformedResponse("response has no text content".into()).into());
    }
    Ok(text.join("\n"))
}
