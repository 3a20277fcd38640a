//! Task wrapper: turns a handler call into a deferred unit of work.

use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::queue::invocation::{CommandInput, SharedInvocation};
use crate::{AppError, Result};

/// Future returned by command handlers and queued thunks.
pub type TaskFuture = BoxFuture<'static, Result<()>>;

/// Zero-argument deferred call.
pub type Thunk = Box<dyn FnOnce() -> TaskFuture + Send>;

/// Command handler: `(invocation, input) -> future`.
pub type Handler = Arc<dyn Fn(SharedInvocation, CommandInput) -> TaskFuture + Send + Sync>;

/// Box an async closure into a [`Handler`].
#[must_use]
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(SharedInvocation, CommandInput) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(
        move |invocation: SharedInvocation, input: CommandInput| -> TaskFuture {
            Box::pin(f(invocation, input))
        },
    )
}

/// A unit of work waiting in the queue.
///
/// Holds the invocation it answers so the drain loop can report failures
/// back to the requester. Consumed exactly once.
pub struct QueuedTask {
    label: String,
    seq: u64,
    invocation: SharedInvocation,
    thunk: Thunk,
}

impl QueuedTask {
    /// Build a task from raw parts.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MissingInvocation` when `invocation` is `None`.
    /// That is an integration bug and is surfaced before anything is queued.
    pub fn from_parts(
        label: impl Into<String>,
        invocation: Option<SharedInvocation>,
        thunk: Thunk,
    ) -> Result<Self> {
        let label = label.into();
        let invocation = invocation.ok_or_else(|| {
            AppError::MissingInvocation(format!("task `{label}` has no command invocation"))
        })?;
        Ok(Self {
            label,
            seq: 0,
            invocation,
            thunk,
        })
    }

    /// Defer `handler(invocation, input)` until the drain loop reaches it.
    #[must_use]
    pub fn wrap(handler: Handler, invocation: SharedInvocation, input: CommandInput) -> Self {
        let label = input.command.clone();
        let call_invocation = Arc::clone(&invocation);
        Self {
            label,
            seq: 0,
            invocation,
            thunk: Box::new(move || handler(call_invocation, input)),
        }
    }

    /// Human-readable label, normally the command name.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Arrival sequence number, assigned on enqueue.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The invocation this task answers.
    #[must_use]
    pub fn invocation(&self) -> &SharedInvocation {
        &self.invocation
    }

    pub(crate) fn set_seq(&mut self, seq: u64) {
        self.seq = seq;
    }

    pub(crate) fn into_parts(self) -> (String, u64, SharedInvocation, Thunk) {
        (self.label, self.seq, self.invocation, self.thunk)
    }
}

impl Debug for QueuedTask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedTask")
            .field("label", &self.label)
            .field("seq", &self.seq)
            .field("invocation", &self.invocation.id())
            .finish_non_exhaustive()
    }
}
