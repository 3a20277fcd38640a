//! `/reset` command.

use tracing::warn;

use crate::queue::{handler, Handler};

/// Confirmation sent after a reset.
pub const RESET_TEXT: &str = "> **Info: I have forgotten everything.**";

/// Handler for `/reset`.
#[must_use]
pub fn reset_handler() -> Handler {
    handler(|invocation, input| async move {
        invocation.follow_up(RESET_TEXT.to_owned()).await?;
        warn!(user = %input.user_id, channel = %input.channel_id, "conversation reset");
        Ok(())
    })
}
