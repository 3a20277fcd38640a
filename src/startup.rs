//! Starting prompt posted once when the bot comes up.

use std::path::Path;

use slack_morphism::prelude::SlackChannelId;
use tracing::{info, warn};

use crate::config::GlobalConfig;
use crate::provider::chat::ChatBackend;
use crate::slack::client::SlackMessage;
use crate::Result;

/// Read the starting prompt at `path` and ask the backend to answer it.
///
/// Returns `Ok(None)` when the file holds nothing but whitespace.
///
/// # Errors
///
/// Returns `AppError::Io` if the file cannot be read, or the backend's
/// error if the completion fails.
pub async fn starting_reply(path: &Path, backend: &dyn ChatBackend) -> Result<Option<String>> {
    let prompt = tokio::fs::read_to_string(path).await?;
    if prompt.trim().is_empty() {
        info!(path = %path.display(), "starting prompt is empty, skipping");
        return Ok(None);
    }

    info!(prompt_len = prompt.len(), "sending starting prompt");
    let reply = backend.complete(prompt).await?;
    info!(reply_len = reply.len(), "starting prompt answered");
    Ok(Some(reply))
}

/// Build the channel message answering the configured starting prompt.
///
/// Never fails: a missing channel or prompt skips the message, and read or
/// backend errors are logged and skip it too.
pub async fn starting_message(
    config: &GlobalConfig,
    backend: &dyn ChatBackend,
) -> Option<SlackMessage> {
    let path = config.starting_prompt.as_deref()?;
    let Some(channel) = config.slack.channel_id.clone() else {
        info!("no channel configured, skipping starting prompt");
        return None;
    };

    match starting_reply(path, backend).await {
        Ok(reply) => reply.map(|text| SlackMessage::plain(SlackChannelId(channel), text)),
        Err(err) => {
            warn!(%err, path = %path.display(), "starting prompt failed");
            None
        }
    }
}
