//! `/chat` command.

use std::sync::Arc;

use tracing::info;

use crate::provider::chat::ChatBackend;
use crate::queue::{handler, Handler};

/// Reply sent when `/chat` is used without a message.
pub const EMPTY_MESSAGE_TEXT: &str = "> **Error: Please type a message after `/chat`.**";

/// Handler for `/chat`. Provider errors are returned so the queue reports
/// them to the requester.
#[must_use]
pub fn chat_handler(backend: Arc<dyn ChatBackend>) -> Handler {
    handler(move |invocation, input| {
        let backend = Arc::clone(&backend);
        async move {
            let message = input.text.trim();
            if message.is_empty() {
                return invocation.follow_up(EMPTY_MESSAGE_TEXT.to_owned()).await;
            }

            info!(
                invocation = invocation.id(),
                user = %input.user_id,
                channel = %input.channel_id,
                "chat request"
            );
            let reply = backend.complete(message.to_owned()).await?;
            invocation.follow_up(reply).await
        }
    })
}
