//! Platform-neutral view of a single command invocation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::queue::ack::AckState;
use crate::Result;

/// Shared handle to an invocation; cloned into the task that answers it.
pub type SharedInvocation = Arc<dyn Invocation>;

/// Capabilities the queue needs from a platform request.
///
/// Implementations wrap whatever the chat platform hands over for a slash
/// command: an acknowledgment channel, a follow-up channel, and the
/// identity of the requester. The queue core never looks past this trait.
pub trait Invocation: Send + Sync {
    /// Short identifier used to correlate log lines for this invocation.
    fn id(&self) -> &str;

    /// Platform user that triggered the command.
    fn user_id(&self) -> &str;

    /// Channel or conversation the command came from.
    fn channel_id(&self) -> &str;

    /// Once-flag recording whether the "processing" signal was delivered.
    fn ack_state(&self) -> &AckState;

    /// Send the "processing" acknowledgment to the platform.
    ///
    /// Callers go through [`acknowledge`](crate::queue::acknowledge), which
    /// guarantees this runs at most once per invocation.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Ack`](crate::AppError::Ack) when the platform
    /// rejects the acknowledgment, or
    /// [`AppError::Expired`](crate::AppError::Expired) when the request is
    /// already gone.
    fn send_ack(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Send a follow-up message tied to this invocation.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Expired`](crate::AppError::Expired) once the
    /// platform no longer accepts replies, or
    /// [`AppError::Slack`](crate::AppError::Slack) for any other delivery
    /// failure.
    fn follow_up(&self, text: String) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Whether the platform is still expected to accept follow-ups.
    fn is_usable(&self) -> bool;
}

/// Arguments of a slash command, independent of the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInput {
    /// Command name without the leading slash, lowercased.
    pub command: String,
    /// Free text typed after the command name.
    pub text: String,
    /// Requesting user.
    pub user_id: String,
    /// Originating channel.
    pub channel_id: String,
}

impl CommandInput {
    /// Build an input, normalising the command name.
    #[must_use]
    pub fn new(
        command: &str,
        text: impl Into<String>,
        user_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            command: normalize_command(command),
            text: text.into(),
            user_id: user_id.into(),
            channel_id: channel_id.into(),
        }
    }
}

/// Strip the leading slash and surrounding whitespace, then lowercase.
#[must_use]
pub fn normalize_command(raw: &str) -> String {
    raw.trim().trim_start_matches('/').to_lowercase()
}
