//! Slash command handlers and their registration.

pub mod chat;
pub mod help;
pub mod registry;
pub mod reset;
pub mod visibility;

use std::sync::Arc;

use crate::provider::chat::ChatBackend;
use crate::queue::CommandQueue;

pub use self::registry::{queued, CommandRegistry};
pub use self::visibility::ReplyVisibility;

/// Build the registry with every command the bot serves.
///
/// Commands that call a provider or touch conversation state go through
/// `queue`; cheap informational commands answer immediately.
#[must_use]
pub fn build_registry(
    queue: CommandQueue,
    backend: Arc<dyn ChatBackend>,
    visibility: &Arc<ReplyVisibility>,
) -> CommandRegistry {
    let mut registry = CommandRegistry::new(queue);
    registry
        .register_queued("chat", chat::chat_handler(backend))
        .register_queued("reset", reset::reset_handler())
        .register("help", help::help_handler())
        .register("private", visibility::private_handler(Arc::clone(visibility)))
        .register("public", visibility::public_handler(Arc::clone(visibility)));
    registry
}
