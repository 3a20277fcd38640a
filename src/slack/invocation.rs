//! Slash command invocation backed by Slack's `response_url`.
//!
//! Slack accepts up to five posts to a command's `response_url` within 30
//! minutes of the command. The acknowledgment uses one, each follow-up
//! another.

use std::future::Future;
use std::net::IpAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use slack_morphism::prelude::SlackCommandEvent;
use tracing::debug;

use crate::commands::ReplyVisibility;
use crate::queue::{AckState, Invocation};
use crate::{AppError, Result};

/// How long Slack honours a `response_url`.
pub const RESPONSE_URL_TTL: Duration = Duration::from_secs(30 * 60);

/// A Slack slash command awaiting its answer.
pub struct SlackInvocation {
    id: String,
    command: String,
    user_id: String,
    channel_id: String,
    response_url: String,
    http: reqwest::Client,
    visibility: Arc<ReplyVisibility>,
    received_at: Instant,
    ack: AckState,
}

impl SlackInvocation {
    /// Build an invocation from a Socket Mode slash command event.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MissingInvocation` if the event carries no usable
    /// `response_url`.
    pub fn from_command_event(
        event: &SlackCommandEvent,
        http: reqwest::Client,
        visibility: Arc<ReplyVisibility>,
    ) -> Result<Self> {
        Self::new(
            &event.command.0,
            event.user_id.to_string(),
            event.channel_id.to_string(),
            event.response_url.0.as_str(),
            http,
            visibility,
        )
    }

    /// Build an invocation from its raw parts.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MissingInvocation` if `response_url` is neither an
    /// `https` URL nor a plain `http` URL on a loopback host.
    pub fn new(
        command: &str,
        user_id: String,
        channel_id: String,
        response_url: &str,
        http: reqwest::Client,
        visibility: Arc<ReplyVisibility>,
    ) -> Result<Self> {
        if !is_usable_response_url(response_url) {
            return Err(AppError::MissingInvocation(format!(
                "slash command {command} has no usable response_url"
            )));
        }

        let mut id = uuid::Uuid::new_v4().simple().to_string();
        id.truncate(8);

        Ok(Self {
            id,
            command: command.to_owned(),
            user_id,
            channel_id,
            response_url: response_url.to_owned(),
            http,
            visibility,
            received_at: Instant::now(),
            ack: AckState::new(),
        })
    }

    async fn post(&self, payload: &serde_json::Value) -> Result<()> {
        let response = self
            .http
            .post(&self.response_url)
            .json(payload)
            .send()
            .await
            .map_err(|err| AppError::Slack(format!("response_url post failed: {err}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| AppError::Slack(format!("response_url reply unreadable: {err}")))?;
        check_response(status, &body)
    }

    async fn post_ack(&self) -> Result<()> {
        let text = format!("\u{23f3} Processing `{}`\u{2026}", self.command);
        debug!(invocation = %self.id, "posting acknowledgment");
        self.post(&json!({ "response_type": "ephemeral", "text": text }))
            .await
            .map_err(|err| match err {
                AppError::Expired(_) => err,
                other => AppError::Ack(other.to_string()),
            })
    }

    async fn post_follow_up(&self, text: &str) -> Result<()> {
        let response_type = if self.visibility.is_private() {
            "ephemeral"
        } else {
            "in_channel"
        };
        self.post(&json!({
            "response_type": response_type,
            "replace_original": false,
            "text": text,
        }))
        .await
    }
}

impl Invocation for SlackInvocation {
    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn channel_id(&self) -> &str {
        &self.channel_id
    }

    fn ack_state(&self) -> &AckState {
        &self.ack
    }

    fn send_ack(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(self.post_ack())
    }

    fn follow_up(&self, text: String) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move { self.post_follow_up(&text).await })
    }

    fn is_usable(&self) -> bool {
        self.received_at.elapsed() < RESPONSE_URL_TTL
    }
}

fn is_usable_response_url(raw: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(raw) else {
        return false;
    };
    match url.scheme() {
        "https" => url.host().is_some(),
        "http" => url.host_str().is_some_and(|host| {
            host == "localhost"
                || host
                    .trim_start_matches('[')
                    .trim_end_matches(']')
                    .parse::<IpAddr>()
                    .is_ok_and(|ip| ip.is_loopback())
        }),
        _ => false,
    }
}

/// Interpret Slack's answer to a `response_url` post.
///
/// # Errors
///
/// Returns `AppError::Expired` for gone or exhausted URLs and
/// `AppError::Slack` for any other rejection.
pub fn check_response(status: u16, body: &str) -> Result<()> {
    if status == 404 || status == 410 || body.contains("expired_url") || body.contains("used_url")
    {
        return Err(AppError::Expired(format!(
            "response_url rejected ({status}): {}",
            body.trim()
        )));
    }

    if !(200..300).contains(&status) || body.contains("\"ok\":false") {
        return Err(AppError::Slack(format!(
            "response_url rejected ({status}): {}",
            body.trim()
        )));
    }

    Ok(())
}
