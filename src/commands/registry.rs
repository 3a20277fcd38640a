//! Command registry and the queued-handler wrapper.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::queue::invocation::normalize_command;
use crate::queue::{
    CommandInput, CommandQueue, Handler, QueuedTask, SharedInvocation, TaskFuture,
};
use crate::{AppError, Result};

/// Wrap `handler` so each call is acknowledged and deferred onto `queue`.
///
/// The returned handler has the same signature as the original. Awaiting it
/// only covers admission (acknowledgment and enqueue); the original handler
/// runs later on the drain loop.
#[must_use]
pub fn queued(queue: CommandQueue, handler: Handler) -> Handler {
    Arc::new(move |invocation: SharedInvocation, input: CommandInput| -> TaskFuture {
        let queue = queue.clone();
        let task = QueuedTask::wrap(Arc::clone(&handler), invocation, input);
        Box::pin(async move { queue.enqueue(task).await })
    })
}

/// Name-to-handler table consulted by the platform adapter.
pub struct CommandRegistry {
    queue: CommandQueue,
    handlers: HashMap<String, Handler>,
}

impl CommandRegistry {
    /// Create an empty registry whose queued commands share `queue`.
    #[must_use]
    pub fn new(queue: CommandQueue) -> Self {
        Self {
            queue,
            handlers: HashMap::new(),
        }
    }

    /// Register a handler that runs immediately on dispatch.
    pub fn register(&mut self, name: &str, handler: Handler) -> &mut Self {
        self.handlers.insert(normalize_command(name), handler);
        self
    }

    /// Register a handler that is serialized through the queue.
    pub fn register_queued(&mut self, name: &str, handler: Handler) -> &mut Self {
        let wrapped = queued(self.queue.clone(), handler);
        self.register(name, wrapped)
    }

    /// Registered command names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The queue backing queued commands.
    #[must_use]
    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// Route an invocation to its handler.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UnknownCommand` if nothing is registered under
    /// `input.command`, or the handler's admission error.
    pub async fn dispatch(&self, invocation: SharedInvocation, input: CommandInput) -> Result<()> {
        let handler = self
            .handlers
            .get(&input.command)
            .cloned()
            .ok_or_else(|| AppError::UnknownCommand(format!("/{}", input.command)))?;
        debug!(command = %input.command, invocation = invocation.id(), "dispatching command");
        handler(invocation, input).await
    }
}
