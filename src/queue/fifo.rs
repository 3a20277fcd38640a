//! FIFO queue core and its sequential drain loop.
//!
//! Producers append under a mutex and, if no drain loop is active, spawn
//! exactly one. The drain loop pops the head, releases the lock, runs the
//! task to completion, and repeats until it observes an empty queue. The
//! `DRAINING -> IDLE` transition happens under the same lock producers use,
//! so a task appended concurrently is never stranded.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, info_span, Instrument};

use crate::queue::ack;
use crate::queue::report;
use crate::queue::task::QueuedTask;
use crate::{AppError, Result};

#[derive(Default)]
struct QueueState {
    tasks: VecDeque<QueuedTask>,
    draining: bool,
    next_seq: u64,
}

struct Inner {
    state: Mutex<QueueState>,
    draining_tx: watch::Sender<bool>,
    activations: AtomicU64,
}

/// Unbounded single-consumer command queue.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct CommandQueue {
    inner: Arc<Inner>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    /// Create an idle, empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (draining_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState::default()),
                draining_tx,
                activations: AtomicU64::new(0),
            }),
        }
    }

    /// Acknowledge the task's invocation, append the task, and make sure a
    /// drain loop is running.
    ///
    /// Never rejects on size. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the acknowledgment error if the platform could not be told
    /// that processing started; the task is dropped without running.
    pub async fn enqueue(&self, mut task: QueuedTask) -> Result<()> {
        let invocation = Arc::clone(task.invocation());
        ack::acknowledge(invocation.as_ref()).await?;

        let spawn = {
            let mut state = self.inner.state.lock().await;
            state.next_seq += 1;
            task.set_seq(state.next_seq);
            debug!(
                task = task.label(),
                seq = task.seq(),
                depth = state.tasks.len(),
                "task queued"
            );
            state.tasks.push_back(task);

            if state.draining {
                false
            } else {
                state.draining = true;
                self.inner.draining_tx.send_replace(true);
                self.inner.activations.fetch_add(1, Ordering::AcqRel);
                true
            }
        };

        if spawn {
            tokio::spawn(drain(Arc::clone(&self.inner)));
        }
        Ok(())
    }

    /// Whether a drain loop is currently active.
    #[must_use]
    pub fn is_draining(&self) -> bool {
        *self.inner.draining_tx.borrow()
    }

    /// Number of drain loops spawned since the queue was created.
    #[must_use]
    pub fn activations(&self) -> u64 {
        self.inner.activations.load(Ordering::Acquire)
    }

    /// Number of tasks waiting to start (excludes the one running).
    pub async fn len(&self) -> usize {
        self.inner.state.lock().await.tasks.len()
    }

    /// Whether no task is waiting to start.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Wait until the drain loop has emptied the queue and gone idle.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.draining_tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|draining| !*draining).await;
    }
}

async fn drain(inner: Arc<Inner>) {
    info!("drain loop started");
    loop {
        let next = {
            let mut state = inner.state.lock().await;
            let next = state.tasks.pop_front();
            if next.is_none() {
                state.draining = false;
                inner.draining_tx.send_replace(false);
            }
            next
        };

        let Some(task) = next else { break };
        run_task(task).await;
    }
    info!("drain loop idle");
}

/// Run one task to completion. Errors and panics stop here.
async fn run_task(task: QueuedTask) {
    let (label, seq, invocation, thunk) = task.into_parts();
    let span = info_span!("queued_task", task = %label, seq, invocation = invocation.id());

    async move {
        info!("task started");
        let outcome = AssertUnwindSafe(async move { thunk().await })
            .catch_unwind()
            .await;

        let failure = match outcome {
            Ok(Ok(())) => {
                info!("task completed");
                return;
            }
            Ok(Err(err)) => err,
            Err(payload) => AppError::Panicked(panic_message(payload.as_ref())),
        };

        error!(%failure, "task failed");
        report::report_failure(invocation.as_ref(), &failure).await;
    }
    .instrument(span)
    .await;
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "task panicked".into()
    }
}
