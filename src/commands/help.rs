//! `/help` command.

use tracing::info;

use crate::queue::{acknowledge, handler, Handler};

/// Text listing the available commands.
pub const HELP_TEXT: &str = ":star: *BASIC COMMANDS*\n\
    - `/chat [message]` Chat with Claude!\n\
    - `/private` Send replies only to you\n\
    - `/public` Send replies to the channel\n\
    - `/reset` Clear Claude conversation history\n\
    - `/help` Show this message";

/// Handler for `/help`. Runs immediately, outside the queue.
#[must_use]
pub fn help_handler() -> Handler {
    handler(|invocation, input| async move {
        acknowledge(invocation.as_ref()).await?;
        info!(user = %input.user_id, "help requested");
        invocation.follow_up(HELP_TEXT.to_owned()).await
    })
}
